use libcat_e2e_tests::{prepare_env, spawn_server};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard) = prepare_env("test_health").await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();

    let client = reqwest::Client::new();
    let response = client
        .get(base_url.join("health").unwrap())
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");

    let response = client
        .get(base_url.join("api-docs/openapi.json").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let docs: serde_json::Value = response.json().await.unwrap();
    assert!(docs["paths"]["/api/transfer/import"].is_object());
    let export = docs["paths"]["/api/transfer/export"]["get"]["description"]
        .as_str()
        .unwrap();
    assert!(export.contains("xlsx"));
    assert!(docs["paths"]["/auth/login"].is_object());
}
