//! Repository Module
//!
//! Free async functions over `&SqlitePool` or any [`SqliteExecutor`](sqlx::SqliteExecutor),
//! so the same query can run on the pool or inside an open transaction.

pub mod dining_table;
pub mod food;
pub mod order;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database(msg)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate() {
        let db = DbService::in_memory().await.unwrap();
        dining_table::create(&db.pool, shared::models::DiningTableCreate { number: 1 })
            .await
            .unwrap();
        let err = dining_table::create(&db.pool, shared::models::DiningTableCreate { number: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)), "got {err:?}");
    }

    #[test]
    fn test_app_error_codes() {
        let err: AppError = RepoError::Validation("bad".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let err: AppError = RepoError::Duplicate("dup".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }
}
