pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
pub mod post_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

use crate::domain::error::DomainError;
use tracing::error;

/// Name of the violated constraint, if the error came from one.
pub(crate) fn violated_constraint(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned)
}

pub(crate) fn internal(context: &str, e: sqlx::Error) -> DomainError {
    error!("{}: {}", context, e);
    DomainError::Internal(format!("database error: {}", e))
}
