use libcat_app::rest_api::Page;
use libcat_dal::{
    author::{Author, AuthorShort},
    book::{Book, BookShort},
};
use libcat_e2e_tests::{
    TestUser, add_user, extend_url, launch_env, login, now, prepare_env,
    rest::{create_author, create_book},
};
use reqwest::StatusCode;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_authors() {
    let (args, _config_guard) = prepare_env("test_authors").await.unwrap();
    let base_url = args.base_url.clone();
    add_user(&args, TestUser::Admin).await.unwrap();
    let (client, _) = launch_env(args, TestUser::TrustedUser).await.unwrap();
    let api_url = base_url.join("api/author").unwrap();

    let new_author = create_author(&client, &base_url, "Lesya", "Ukrainka")
        .await
        .unwrap();
    assert_eq!(1, new_author.version);
    assert_eq!(new_author.bio, "No bio");
    let time_diff = now() - new_author.created;
    assert!(time::Duration::seconds(5) > time_diff);

    let record_url = extend_url(&api_url, new_author.id);
    let response = client.get(record_url.clone()).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    let rec: Author = response.json().await.unwrap();
    assert_eq!(rec.surname, "Ukrainka");

    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"name": "Lesya", "surname": "Ukrainka"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"name": "R2D2", "surname": "Droid"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // padded name would never match a trimmed import cell
    let response = client
        .post(api_url.clone())
        .json(&serde_json::json!({"name": "Taras ", "surname": "Shevchenko"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let updated_author = serde_json::json!({
        "name": rec.name,
        "surname": rec.surname,
        "bio": "Poet and playwright",
        "version": rec.version,
    });
    let response = client
        .put(record_url.clone())
        .json(&updated_author)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::OK);
    let rec: Author = response.json().await.unwrap();
    assert_eq!(rec.bio, "Poet and playwright");
    assert_eq!(rec.version, 2);

    // stale version
    let response = client
        .put(record_url.clone())
        .json(&updated_author)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .put(record_url.clone())
        .json(&serde_json::json!({"name": "Lesya", "surname": "Ukrainka", "bio": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for (name, surname) in [("Ivan", "Franko"), ("Taras", "Shevchenko")] {
        create_author(&client, &base_url, name, surname).await.unwrap();
    }

    let response = client
        .get(api_url.clone())
        .query(&[("page", "1"), ("page_size", "2"), ("sort", "surname")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let page: Page<AuthorShort> = response.json().await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].surname, "Franko");

    let response = client
        .get(api_url.clone())
        .query(&[("sort", "password")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: u64 = client
        .get(base_url.join("api/author/count").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count, 3);

    let book = create_book(
        &client,
        &base_url,
        "Forest Song",
        "9780000000003",
        Some(new_author.id),
        &[],
    )
    .await
    .unwrap();

    let books: Page<BookShort> = client
        .get(extend_url(&record_url, "books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books.total, 1);
    assert_eq!(books.rows[0].title, "Forest Song");

    // only admin deletes authors
    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (admin, _) = login(&base_url, TestUser::Admin).await.unwrap();
    let response = admin.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(record_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // default policy keeps books without author
    let book: Book = client
        .get(extend_url(&base_url.join("api/book").unwrap(), book.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(book.author.is_none());
}
