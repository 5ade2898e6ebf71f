use futures::{FutureExt as _, future::BoxFuture};
use libcat_dal::{
    Error,
    account::{AccountEvent, AccountHooks, AccountObserver, DEFAULT_COLLECTION},
    collection::{CollectionRepositoryImpl, CreateCollection, UpdateCollection},
    new_memory_pool,
    profile::{ProfileRepositoryImpl, UpdateProfile},
    user::{CreateUser, UserRepositoryImpl},
};
use libcat_types::claim::Role;
use sqlx::SqliteConnection;
use tracing_test::traced_test;

fn new_user(name: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: format!("{name}@library.org").parse().unwrap(),
        password: Some("secret-password".to_string()),
        roles: Some(vec!["trusted".to_string()]),
    }
}

async fn count(pool: &libcat_dal::Pool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_account_creation_provisions_profile_and_collection() {
    let pool = new_memory_pool().await.unwrap();
    let users = UserRepositoryImpl::new(pool.clone());

    let user = users.create(new_user("reader")).await.unwrap();
    assert_eq!(user.roles, vec![Role::Trusted]);

    let collections = CollectionRepositoryImpl::new(pool.clone())
        .list(user.id)
        .await
        .unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, DEFAULT_COLLECTION);

    let profile = ProfileRepositoryImpl::new(pool.clone())
        .get_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(profile.user_id, user.id);

    assert!(logs_contain("Notifying profile"));
}

#[tokio::test]
async fn test_failed_account_creates_nothing() {
    let pool = new_memory_pool().await.unwrap();
    let users = UserRepositoryImpl::new(pool.clone());
    users.create(new_user("reader")).await.unwrap();

    let mut duplicate = new_user("reader");
    duplicate.email = "other@library.org".parse().unwrap();
    assert!(matches!(
        users.create(duplicate).await,
        Err(Error::DuplicateKey(_))
    ));

    assert_eq!(count(&pool, "users").await, 1);
    assert_eq!(count(&pool, "user_profile").await, 1);
    assert_eq!(count(&pool, "collection").await, 1);
}

struct FailingObserver;

impl AccountObserver for FailingObserver {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn notify<'a>(
        &'a self,
        _conn: &'a mut SqliteConnection,
        _event: &'a AccountEvent,
    ) -> BoxFuture<'a, libcat_dal::error::Result<()>> {
        async { Err(Error::RecordNotFound("mailbox".to_string())) }.boxed()
    }
}

#[tokio::test]
async fn test_failing_observer_rolls_back_account() {
    let pool = new_memory_pool().await.unwrap();
    let users = UserRepositoryImpl::with_hooks(
        pool.clone(),
        AccountHooks::default().with_observer(FailingObserver),
    );
    assert!(users.create(new_user("reader")).await.is_err());
    assert_eq!(count(&pool, "users").await, 0);
    assert_eq!(count(&pool, "user_profile").await, 0);
    assert_eq!(count(&pool, "collection").await, 0);
}

#[tokio::test]
async fn test_password_check() {
    let pool = new_memory_pool().await.unwrap();
    let users = UserRepositoryImpl::new(pool);
    let user = users.create(new_user("reader")).await.unwrap();

    let checked = users
        .check_password("reader@library.org", "secret-password")
        .await
        .unwrap();
    assert_eq!(checked.id, user.id);
    assert!(matches!(
        users.check_password("reader@library.org", "wrong").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        users.check_password("nobody@library.org", "secret-password").await,
        Err(Error::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_collections_are_owner_scoped() {
    let pool = new_memory_pool().await.unwrap();
    let users = UserRepositoryImpl::new(pool.clone());
    let owner = users.create(new_user("owner")).await.unwrap();
    let other = users.create(new_user("other")).await.unwrap();
    sqlx::query("INSERT INTO book (id, title, isbn) VALUES (1, 'Kobzar', '9780000000001')")
        .execute(&pool)
        .await
        .unwrap();

    let repo = CollectionRepositoryImpl::new(pool.clone());
    let collection = repo
        .create(
            owner.id,
            CreateCollection {
                name: "Favourites".to_string(),
                information: None,
            },
        )
        .await
        .unwrap();
    assert!(repo.add_book(collection.id, owner.id, 1).await.unwrap());
    assert!(!repo.add_book(collection.id, owner.id, 1).await.unwrap());
    assert_eq!(repo.books(collection.id, owner.id).await.unwrap().len(), 1);

    assert!(matches!(
        repo.get(collection.id, other.id).await,
        Err(Error::RecordNotFound(_))
    ));
    assert!(matches!(
        repo.add_book(collection.id, other.id, 1).await,
        Err(Error::RecordNotFound(_))
    ));

    let renamed = repo
        .update(
            collection.id,
            owner.id,
            UpdateCollection {
                name: "Best".to_string(),
                information: "all time".to_string(),
                version: Some(collection.version),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Best");

    repo.remove_book(collection.id, owner.id, 1).await.unwrap();
    repo.delete(collection.id, owner.id).await.unwrap();
    assert_eq!(repo.list(owner.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_likes() {
    let pool = new_memory_pool().await.unwrap();
    let user = UserRepositoryImpl::new(pool.clone())
        .create(new_user("reader"))
        .await
        .unwrap();
    sqlx::query("INSERT INTO book (id, title, isbn) VALUES (1, 'Kobzar', '9780000000001')")
        .execute(&pool)
        .await
        .unwrap();
    let repo = ProfileRepositoryImpl::new(pool);

    let profile = repo
        .update(
            user.id,
            UpdateProfile {
                status: "reading".to_string(),
                bio: "Poetry fan".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.status, "reading");

    assert!(repo.like(user.id, 1).await.unwrap());
    assert_eq!(repo.liked_books(user.id).await.unwrap().len(), 1);
    assert!(matches!(
        repo.like(user.id, 2).await,
        Err(Error::InvalidReference(_))
    ));
    repo.unlike(user.id, 1).await.unwrap();
    assert!(repo.liked_books(user.id).await.unwrap().is_empty());
}
