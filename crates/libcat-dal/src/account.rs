//! Side effects of account creation.
//!
//! Observers run inside the transaction which inserted the account, so either the account
//! is created with everything observers provision for it, or nothing is created.

use futures::{FutureExt as _, future::BoxFuture};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::{Error, error::Result};

pub const DEFAULT_COLLECTION: &str = "To read";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    Created { user_id: i64 },
}

pub trait AccountObserver: Send + Sync {
    fn name(&self) -> &'static str;

    fn notify<'a>(
        &'a self,
        conn: &'a mut SqliteConnection,
        event: &'a AccountEvent,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Creates empty profile for new account
pub struct ProfileProvisioner;

impl AccountObserver for ProfileProvisioner {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn notify<'a>(
        &'a self,
        conn: &'a mut SqliteConnection,
        event: &'a AccountEvent,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let AccountEvent::Created { user_id } = event;
            sqlx::query("INSERT INTO user_profile (user_id) VALUES (?)")
                .bind(*user_id)
                .execute(conn)
                .await
                .map_err(Error::on_write("Profile"))?;
            Ok(())
        }
        .boxed()
    }
}

/// Creates default "To read" collection for new account
pub struct DefaultCollectionProvisioner;

impl AccountObserver for DefaultCollectionProvisioner {
    fn name(&self) -> &'static str {
        "default collection"
    }

    fn notify<'a>(
        &'a self,
        conn: &'a mut SqliteConnection,
        event: &'a AccountEvent,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let AccountEvent::Created { user_id } = event;
            sqlx::query("INSERT INTO collection (creator_id, name) VALUES (?, ?)")
                .bind(*user_id)
                .bind(DEFAULT_COLLECTION)
                .execute(conn)
                .await
                .map_err(Error::on_write("Collection"))?;
            Ok(())
        }
        .boxed()
    }
}

pub struct AccountHooks {
    observers: Vec<Box<dyn AccountObserver>>,
}

impl Default for AccountHooks {
    fn default() -> Self {
        Self::empty()
            .with_observer(ProfileProvisioner)
            .with_observer(DefaultCollectionProvisioner)
    }
}

impl AccountHooks {
    pub fn empty() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl AccountObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub async fn emit(&self, conn: &mut SqliteConnection, event: AccountEvent) -> Result<()> {
        for observer in &self.observers {
            debug!("Notifying {} about {event:?}", observer.name());
            observer.notify(&mut *conn, &event).await?;
        }
        Ok(())
    }
}
