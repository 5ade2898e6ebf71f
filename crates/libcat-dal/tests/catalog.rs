use libcat_dal::{
    Error,
    catalog::{CatalogStore, NewAuthor, NewBook, SqliteCatalog},
    new_memory_pool,
};

fn author(name: &str, surname: &str) -> NewAuthor {
    NewAuthor {
        name: name.to_string(),
        surname: surname.to_string(),
        bio: None,
    }
}

#[tokio::test]
async fn test_author_ids_follow_maximum() {
    let store = SqliteCatalog::new(new_memory_pool().await.unwrap());
    assert!(store.insert_author_if_absent(&author("Taras", "Shevchenko")).await.unwrap());
    assert!(!store.insert_author_if_absent(&author("Taras", "Shevchenko")).await.unwrap());
    assert!(store.insert_author_if_absent(&author("Ivan", "Franko")).await.unwrap());

    let franko = store.find_author("Ivan", "Franko").await.unwrap().unwrap();
    assert_eq!(franko.id, 2);
    assert!(store.find_author("Ivan", "Bahrianyi").await.unwrap().is_none());
}

#[tokio::test]
async fn test_books_and_genres() {
    let store = SqliteCatalog::new(new_memory_pool().await.unwrap());
    store.insert_author_if_absent(&author("Taras", "Shevchenko")).await.unwrap();

    let book = store
        .insert_book(&NewBook {
            title: "Kobzar".to_string(),
            author_id: Some(1),
            isbn: "9780000000001".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(store.find_book_by_isbn("9780000000001").await.unwrap(), Some(book.clone()));
    assert_eq!(store.find_book_by_title("Kobzar", Some(1)).await.unwrap(), Some(book.clone()));
    assert!(store.find_book_by_title("Kobzar", None).await.unwrap().is_none());

    let conflict = store
        .insert_book(&NewBook {
            title: "Kobzar".to_string(),
            author_id: Some(1),
            isbn: "9780000000002".to_string(),
        })
        .await;
    assert!(matches!(conflict, Err(Error::DuplicateKey(_))));

    assert!(store.insert_genre_if_absent("poetry").await.unwrap());
    assert!(!store.insert_genre_if_absent("poetry").await.unwrap());
    assert!(store.find_genre("Poetry").await.unwrap().is_none());
    let genre = store.find_genre("poetry").await.unwrap().unwrap();
    assert!(store.attach_genre(book.id, genre.id).await.unwrap());
    assert!(!store.attach_genre(book.id, genre.id).await.unwrap());

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.books, 1);
    assert_eq!(counts.genre_links, 1);
}

#[tokio::test]
async fn test_authorless_title_is_unique() {
    let store = SqliteCatalog::new(new_memory_pool().await.unwrap());
    let tales = |isbn: &str| NewBook {
        title: "Anonymous Tales".to_string(),
        author_id: None,
        isbn: isbn.to_string(),
    };
    let first = store.insert_book(&tales("9780000000009")).await.unwrap();
    let second = store.insert_book(&tales("9780000000010")).await;
    assert!(matches!(second, Err(Error::DuplicateKey(_))));
    assert_eq!(store.find_book_by_title("Anonymous Tales", None).await.unwrap(), Some(first));
    assert_eq!(store.counts().await.unwrap().books, 1);
}

#[tokio::test]
async fn test_export_rows() {
    let store = SqliteCatalog::new(new_memory_pool().await.unwrap());
    assert!(store.export_rows().await.unwrap().is_empty());

    store.insert_author_if_absent(&author("Lesya", "Ukrainka")).await.unwrap();
    let orphan = store
        .insert_book(&NewBook {
            title: "Anonymous Tales".to_string(),
            author_id: None,
            isbn: "9780000000009".to_string(),
        })
        .await
        .unwrap();
    let song = store
        .insert_book(&NewBook {
            title: "Forest Song".to_string(),
            author_id: Some(1),
            isbn: "9780000000003".to_string(),
        })
        .await
        .unwrap();
    for name in ["drama", "poetry"] {
        store.insert_genre_if_absent(name).await.unwrap();
        let genre = store.find_genre(name).await.unwrap().unwrap();
        store.attach_genre(song.id, genre.id).await.unwrap();
    }

    let rows = store.export_rows().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].book_id, orphan.id);
    assert!(rows[0].author.is_none());
    assert!(rows[0].genres.is_empty());
    let author = rows[1].author.as_ref().unwrap();
    assert_eq!(author.surname, "Ukrainka");
    assert_eq!(author.bio, "No bio");
    assert_eq!(rows[1].genres, ["drama", "poetry"]);
}
