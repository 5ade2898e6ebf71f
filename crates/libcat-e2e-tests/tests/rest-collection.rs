use libcat_dal::{book::BookShort, collection::Collection, profile::Profile};
use libcat_e2e_tests::{
    TestUser, add_user, extend_url, launch_env, login, prepare_env,
    rest::{create_author, create_book},
};
use reqwest::StatusCode;
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_collections() {
    let (args, _config_guard) = prepare_env("test_collections").await.unwrap();
    let base_url = args.base_url.clone();
    add_user(&args, TestUser::User).await.unwrap();
    let (client, _) = launch_env(args, TestUser::TrustedUser).await.unwrap();
    let (reader, _) = login(&base_url, TestUser::User).await.unwrap();
    let api_url = base_url.join("api/collection").unwrap();

    let author = create_author(&client, &base_url, "Lina", "Kostenko")
        .await
        .unwrap();
    let book = create_book(&client, &base_url, "Marusia Churai", "9780000000010", Some(author.id), &[])
        .await
        .unwrap();

    let response = client
        .post(api_url.clone())
        .json(&json!({"name": "Favourites", "information": "Books to read again"}))
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::CREATED);
    let collection: Collection = response.json().await.unwrap();
    assert_eq!(collection.version, 1);

    let response = client
        .post(api_url.clone())
        .json(&json!({"name": "Favourites"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let record_url = extend_url(&api_url, collection.id);
    let book_url = extend_url(&extend_url(&record_url, "books"), book.id);
    let response = client.put(book_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = client.put(book_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let books: Vec<BookShort> = client
        .get(extend_url(&record_url, "books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Marusia Churai");

    // collections of other users are not visible
    let response = reader.get(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = reader.put(book_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let own: Vec<Collection> = reader
        .get(api_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(own.iter().all(|c| c.id != collection.id));

    let response = client
        .put(record_url.clone())
        .json(&json!({"name": "Classics", "information": "", "version": collection.version}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Collection = response.json().await.unwrap();
    assert_eq!(updated.name, "Classics");

    let response = client.delete(book_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client.get(record_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[traced_test]
async fn test_profile() {
    let (args, _config_guard) = prepare_env("test_profile").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _) = launch_env(args, TestUser::TrustedUser).await.unwrap();
    let api_url = base_url.join("api/profile").unwrap();

    let profile: Profile = client
        .get(api_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile.status, "");

    let response = client
        .put(api_url.clone())
        .json(&json!({"status": "Reading poetry", "bio": "Librarian"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Profile = response.json().await.unwrap();
    assert_eq!(profile.status, "Reading poetry");

    let book = create_book(&client, &base_url, "Kaidash Family", "9780000000011", None, &[])
        .await
        .unwrap();
    let liked_url = extend_url(&api_url, "liked");
    let like_url = extend_url(&liked_url, book.id);
    let response = client.put(like_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = client.put(like_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let liked: Vec<BookShort> = client
        .get(liked_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked.len(), 1);
    assert!(liked[0].author.is_none());

    let response = client.delete(like_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client.delete(like_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
