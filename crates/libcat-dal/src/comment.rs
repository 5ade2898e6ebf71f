use crate::{ChosenDB, Error, error::Result};
use garde::Validate;
use libcat_types::validation::rules;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateComment {
    #[garde(length(max = 50), custom(rules::title))]
    pub name: String,
    #[garde(length(min = 1, max = 2000))]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Comment {
    pub id: i64,
    pub book_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub text: String,
    pub date_added: time::PrimitiveDateTime,
}

pub type CommentRepository = CommentRepositoryImpl<sqlx::Pool<ChosenDB>>;

pub struct CommentRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> CommentRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, book_id: i64, user_id: i64, payload: CreateComment) -> Result<Comment> {
        let result =
            sqlx::query("INSERT INTO comment (book_id, user_id, name, text) VALUES (?, ?, ?, ?)")
                .bind(book_id)
                .bind(user_id)
                .bind(&payload.name)
                .bind(&payload.text)
                .execute(&self.executor)
                .await
                .map_err(Error::on_write("Comment"))?;
        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, book_id, user_id, name, text, date_added FROM comment WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::not_found("Comment", id))
    }

    /// Newest first
    pub async fn list_for_book(&self, book_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT id, book_id, user_id, name, text, date_added FROM comment
            WHERE book_id = ? ORDER BY date_added DESC, id DESC",
        )
        .bind(book_id)
        .fetch_all(&self.executor)
        .await?;
        Ok(rows)
    }

    /// Users can delete only own comments, admin can delete any
    pub async fn delete(&self, id: i64, user_id: i64, is_admin: bool) -> Result<()> {
        let res = if is_admin {
            sqlx::query("DELETE FROM comment WHERE id = ?")
                .bind(id)
                .execute(&self.executor)
                .await?
        } else {
            sqlx::query("DELETE FROM comment WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(&self.executor)
                .await?
        };
        if res.rows_affected() == 0 {
            debug!("Comment {id} not deleted for user {user_id}");
            return Err(Error::not_found("Comment", id));
        }
        Ok(())
    }
}
