use libcat_dal::user::User;
use libcat_e2e_tests::{TestUser, extend_url, launch_env, prepare_env};
use reqwest::StatusCode;
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_users() {
    let (args, _config_guard) = prepare_env("test_users").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _) = launch_env(args, TestUser::Admin).await.unwrap();
    let api_url = base_url.join("users").unwrap();

    let response = client.get(api_url.clone()).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    let users: Vec<User> = response.json().await.unwrap();
    assert_eq!(users.len(), 1);

    let new_user = json!({
        "name": "librarian",
        "email": "librarian@localhost.org",
        "password": "librarian-password",
        "roles": ["trusted"]
    });
    let response = client
        .post(api_url.clone())
        .json(&new_user)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: User = response.json().await.unwrap();
    assert_eq!(user.roles.len(), 1);

    let response = client
        .post(api_url.clone())
        .json(&json!({
            "name": "hacker",
            "email": "hacker@localhost.org",
            "password": "hacker-password",
            "roles": ["superuser"]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = client
        .delete(extend_url(&api_url, user.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(extend_url(&api_url, user.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let users: Vec<User> = client
        .get(api_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}
