use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::group::GroupRef;
use crate::domain::user::Principal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl Post {
    /// Only the author may change or remove a post.
    pub fn ensure_author(&self, actor: &Principal) -> Result<(), DomainError> {
        if actor.is(self.author_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

impl NewPost {
    pub fn new(
        author_id: Uuid,
        text: &str,
        group_id: Option<i64>,
        image: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            text: required_text(text)?,
            author_id,
            group_id,
            image,
            pub_date: Utc::now(),
        })
    }
}

/// Partial edit. The outer `Option` on `group_id`/`image` means "leave as is",
/// the inner one allows clearing the field.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub group_id: Option<Option<i64>>,
    pub image: Option<Option<String>>,
}

impl PostChanges {
    pub fn validated(mut self) -> Result<Self, DomainError> {
        if let Some(text) = self.text.take() {
            self.text = Some(required_text(&text)?);
        }
        Ok(self)
    }
}

/// Post as shown in feeds: author and group resolved, comments counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub comment_count: i64,
}

pub fn required_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text", "This field is required."));
    }
    Ok(text.to_string())
}
