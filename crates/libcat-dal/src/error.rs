pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Duplicate key: {0} already exists")]
    DuplicateKey(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Version is required for update")]
    MissingVersion,

    #[error("Failed to update record {id}, version {version} is stale or record is missing")]
    FailedUpdate { id: i64, version: i64 },

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),
}

impl Error {
    /// Maps constraint violations of a write statement to domain errors
    pub(crate) fn on_write(entity: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
        move |e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::DuplicateKey(entity.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                Error::InvalidReference(entity.to_string())
            }
            e => Error::DatabaseError(e),
        }
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        Error::RecordNotFound(format!("{entity} {id}"))
    }
}
