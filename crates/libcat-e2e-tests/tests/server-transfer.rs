use libcat_app::rest_api::{
    search::SearchResult,
    stats::{CatalogStats, Charts},
};
use libcat_e2e_tests::{
    TestUser, add_user, launch_env, login, prepare_env, rest::catalog_sheet,
};
use libcat_transfer::{ImportReport, WarningKind, XLSX_MIME};
use reqwest::{
    StatusCode,
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    multipart::{Form, Part},
};
use tracing::info;
use tracing_test::traced_test;

fn upload_form(data: Vec<u8>) -> Form {
    let part = Part::bytes(data)
        .file_name("Data.xlsx")
        .mime_str(XLSX_MIME)
        .unwrap();
    Form::new().part("file", part)
}

const ROWS: [[&str; 10]; 4] = [
    ["1", "Taras", "Shevchenko", "Poet", "1", "Kobzar", "9780000000001", "poetry", "classic", ""],
    ["2", "Lesya", "Ukrainka", "", "2", "Forest Song", "9780000000003", "drama", "poetry", ""],
    ["3", "Ivan", "Franko", "", "3", "Moses", "9780000000004", "poetry", "", ""],
    ["4", "R2D2", "Droid", "", "4", "Manual", "9780000000005", "", "", ""],
];

#[tokio::test]
#[traced_test]
async fn test_import_export() {
    let (args, _config_guard) = prepare_env("test_transfer").await.unwrap();
    let base_url = args.base_url.clone();
    add_user(&args, TestUser::User).await.unwrap();
    let (client, _) = launch_env(args, TestUser::TrustedUser).await.unwrap();
    let (reader, _) = login(&base_url, TestUser::User).await.unwrap();
    let import_url = base_url.join("api/transfer/import").unwrap();
    let export_url = base_url.join("api/transfer/export").unwrap();

    let response = reqwest::Client::new()
        .post(import_url.clone())
        .multipart(upload_form(catalog_sheet(&ROWS)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = reader
        .post(import_url.clone())
        .multipart(upload_form(catalog_sheet(&ROWS)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(import_url.clone())
        .multipart(upload_form(catalog_sheet(&ROWS)))
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::OK);
    let report: ImportReport = response.json().await.unwrap();
    assert_eq!(report.rows, 4);
    assert_eq!(report.authors_created, 3);
    assert_eq!(report.books_created, 3);
    assert_eq!(report.genres_created, 3);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::InvalidAuthor);
    assert_eq!(report.warnings[0].book_id.as_deref(), Some("4"));

    // second import of same data only matches existing books
    let report: ImportReport = client
        .post(import_url.clone())
        .multipart(upload_form(catalog_sheet(&ROWS[..3])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report.books_created, 0);
    assert_eq!(report.books_matched, 3);
    assert_eq!(report.authors_created, 0);

    let response = client
        .post(import_url.clone())
        .multipart(upload_form(b"definitely not a spreadsheet".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(import_url.clone())
        .multipart(Form::new().text("comment", "no file"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = reader.get(export_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.get(export_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap(),
        XLSX_MIME
    );
    assert!(
        response
            .headers()
            .get(CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("Data.xlsx")
    );
    let exported = response.bytes().await.unwrap();
    assert!(exported.starts_with(b"PK"));

    let rows = libcat_transfer::sheet::read_rows(exported.to_vec()).unwrap();
    // header and one row per book
    assert_eq!(rows.len(), 4);

    let stats: CatalogStats = reqwest::get(base_url.join("api/stats").unwrap())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.books, 3);
    assert_eq!(stats.authors, 3);
    assert_eq!(stats.genres, 3);
    assert_eq!(stats.users, 2);
    assert_eq!(stats.latest_authors.len(), 3);

    let charts: Charts = reqwest::get(base_url.join("api/stats/charts").unwrap())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let poetry = charts
        .books_per_genre
        .iter()
        .find(|e| e.label == "poetry")
        .unwrap();
    assert_eq!(poetry.count, 3);

    let result: SearchResult = reqwest::Client::new()
        .get(base_url.join("api/search").unwrap())
        .query(&[("q", "poetry")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result.books_by_genre.len(), 3);
    assert!(result.books_by_title.is_empty());

    let result: SearchResult = reqwest::Client::new()
        .get(base_url.join("api/search").unwrap())
        .query(&[("q", "frank")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result.authors.len(), 1);

    let response = reqwest::Client::new()
        .get(base_url.join("api/search").unwrap())
        .query(&[("q", "")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
