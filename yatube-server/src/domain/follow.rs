use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::{Principal, User};

pub const SELF_FOLLOW: &str = "You can't follow yourself";
pub const ALREADY_FOLLOWING: &str = "Following already exists";

/// Directed edge: `user` follows `author`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub user: String,
    pub author_id: Uuid,
    pub following: String,
    pub created_at: DateTime<Utc>,
}

/// Validated, not yet stored edge.
#[derive(Debug, Clone)]
pub struct NewFollow {
    pub user_id: Uuid,
    pub author_id: Uuid,
}

impl NewFollow {
    pub fn new(user: &Principal, author: &User) -> Result<Self, DomainError> {
        if user.id == author.id || user.username == author.username {
            return Err(DomainError::validation("following", SELF_FOLLOW));
        }
        Ok(Self {
            user_id: user.id,
            author_id: author.id,
        })
    }
}

pub fn already_following() -> DomainError {
    DomainError::validation("following", ALREADY_FOLLOWING)
}

/// Exact, case-insensitive match on either side of the edge.
#[derive(Debug, Clone, Default)]
pub struct FollowSearch {
    pub term: Option<String>,
}

impl FollowSearch {
    pub fn matches(&self, follow: &Follow) -> bool {
        match &self.term {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                follow.user.to_lowercase() == term || follow.following.to_lowercase() == term
            }
        }
    }
}
