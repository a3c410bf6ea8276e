use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::required_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: Uuid,
    pub author: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: i64,
    pub author_id: Uuid,
    pub created: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: i64, author_id: Uuid, text: &str) -> Result<Self, DomainError> {
        Ok(Self {
            text: required_text(text)?,
            post_id,
            author_id,
            created: Utc::now(),
        })
    }
}
