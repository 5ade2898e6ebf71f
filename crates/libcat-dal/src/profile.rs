use crate::{ChosenDB, Error, book::BookShort, error::Result};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateProfile {
    #[garde(length(max = 100))]
    pub status: String,
    #[garde(length(max = 1000))]
    pub bio: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub bio: String,
}

pub type ProfileRepository = ProfileRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct ProfileRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> ProfileRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn get_for_user(&self, user_id: i64) -> Result<Profile> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, status, bio FROM user_profile WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound(format!("Profile of user {user_id}")))
    }

    pub async fn update(&self, user_id: i64, payload: UpdateProfile) -> Result<Profile> {
        let res = sqlx::query("UPDATE user_profile SET status = ?, bio = ? WHERE user_id = ?")
            .bind(&payload.status)
            .bind(&payload.bio)
            .bind(user_id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Profile of user {user_id}")));
        }
        self.get_for_user(user_id).await
    }

    pub async fn liked_books(&self, user_id: i64) -> Result<Vec<BookShort>> {
        let profile = self.get_for_user(user_id).await?;
        let rows = sqlx::query_as::<_, BookShort>(
            "SELECT b.id, b.title, b.isbn, b.author_id, a.name AS author_name, a.surname AS author_surname
            FROM profile_books pb JOIN book b ON pb.book_id = b.id
            LEFT JOIN author a ON b.author_id = a.id
            WHERE pb.profile_id = ? ORDER BY b.title",
        )
        .bind(profile.id)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    /// Returns false if the book was liked already
    pub async fn like(&self, user_id: i64, book_id: i64) -> Result<bool> {
        let profile = self.get_for_user(user_id).await?;
        let res = sqlx::query(
            "INSERT INTO profile_books (profile_id, book_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(profile.id)
        .bind(book_id)
        .execute(&self.executor)
        .await
        .map_err(Error::on_write("Book"))?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn unlike(&self, user_id: i64, book_id: i64) -> Result<()> {
        let profile = self.get_for_user(user_id).await?;
        let res = sqlx::query("DELETE FROM profile_books WHERE profile_id = ? AND book_id = ?")
            .bind(profile.id)
            .bind(book_id)
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::not_found("Liked book", book_id));
        }
        Ok(())
    }
}
