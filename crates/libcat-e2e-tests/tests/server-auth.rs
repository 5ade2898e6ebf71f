use libcat_dal::user::User;
use libcat_e2e_tests::{TestUser, add_user, login, prepare_env, spawn_server};
use reqwest::{StatusCode, redirect::Policy};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_register_and_login() {
    let (args, _config_guard) = prepare_env("test_register").await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap();

    let registration = json!({"name": "reader", "email": "Reader@Localhost.org", "password": "long-password"});
    let response = client
        .post(base_url.join("auth/register").unwrap())
        .json(&registration)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: User = response.json().await.unwrap();
    assert_eq!(user.email, "reader@localhost.org");
    assert!(user.roles.is_empty());

    let response = client
        .post(base_url.join("auth/register").unwrap())
        .json(&registration)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(base_url.join("auth/register").unwrap())
        .json(&json!({"name": "Bad-Name", "email": "bad@localhost.org", "password": "short"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = client
        .post(base_url.join("auth/login").unwrap())
        .json(&json!({"email": "reader@localhost.org", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(base_url.join("auth/login").unwrap())
        .form(&[("email", "reader@localhost.org"), ("password", "long-password")])
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    let token = response.text().await.unwrap();
    assert!(!token.is_empty());

    let profile_url = base_url.join("api/profile").unwrap();
    let response = client
        .get(profile_url.clone())
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = reqwest::get(profile_url.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(profile_url)
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(base_url.join("auth/logout").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
#[traced_test]
async fn test_roles() {
    let (args, _config_guard) = prepare_env("test_roles").await.unwrap();
    let base_url = args.base_url.clone();
    add_user(&args, TestUser::User).await.unwrap();
    add_user(&args, TestUser::TrustedUser).await.unwrap();
    spawn_server(args).await.unwrap();

    let (reader, _) = login(&base_url, TestUser::User).await.unwrap();
    let (trusted, _) = login(&base_url, TestUser::TrustedUser).await.unwrap();
    let anonymous = reqwest::Client::new();
    let author = json!({"name": "Ivan", "surname": "Franko"});
    let api_url = base_url.join("api/author").unwrap();

    let response = anonymous
        .post(api_url.clone())
        .json(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = reader.post(api_url.clone()).json(&author).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = trusted.post(api_url.clone()).json(&author).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // reads are public
    let response = anonymous.get(api_url).send().await.unwrap();
    assert!(response.status().is_success());

    let response = trusted
        .get(base_url.join("users").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
