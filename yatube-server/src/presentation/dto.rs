use serde::{Deserialize, Deserializer, Serialize};

use crate::application::auth_service::{Registration, TokenPair};
use crate::domain::error::DomainError;
use crate::domain::group::GroupChanges;
use crate::domain::page::PageNumber;
use crate::domain::post::PostChanges;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Registration {
            username: r.username,
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
    pub access_expires_in: i64,
    pub token_type: &'static str, // "Bearer"
}

impl TokenPairResponse {
    pub fn new(pair: TokenPair, access_expires_in: i64) -> Self {
        Self {
            access: pair.access,
            refresh: pair.refresh,
            access_expires_in,
            token_type: "Bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
    pub access_expires_in: i64,
    pub token_type: &'static str,
}

// ======================= POSTS =======================

/// `author`, `pub_date` and `id` are not part of the payload; if a client
/// sends them anyway serde drops them.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub group: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

impl UpdatePostRequest {
    /// PATCH keeps omitted fields, PUT replaces the whole writable set.
    pub fn into_changes(self, replace: bool) -> Result<PostChanges, DomainError> {
        if !replace {
            return Ok(PostChanges {
                text: self.text,
                group_id: self.group,
                image: self.image,
            });
        }
        let text = self
            .text
            .ok_or_else(|| DomainError::validation("text", "This field is required."))?;
        Ok(PostChanges {
            text: Some(text),
            group_id: Some(self.group.flatten()),
            image: Some(self.image.flatten()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub group: Option<i64>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ======================= GROUPS =======================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateGroupRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    pub fn into_changes(self, replace: bool) -> Result<GroupChanges, DomainError> {
        if replace && self.title.is_none() {
            return Err(DomainError::validation("title", "This field is required."));
        }
        Ok(GroupChanges {
            title: self.title,
            description: if replace {
                Some(self.description.unwrap_or_default())
            } else {
                self.description
            },
        })
    }
}

// ======================= FOLLOWS =======================

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub following: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}

// ======================= Utils =======================

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
