use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Tokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("{title} ({slug})")]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("[{id}] {title} /{slug}")]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("[{id}] {author} at {pub_date}: {text} ({comment_count} comments)")]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("[{id}] {author}: {text}")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("{user} -> {following}")]
pub struct Follow {
    pub id: i64,
    pub user: String,
    pub following: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub count: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone, Deserialize, Display)]
#[display("{username} ({first_name} {last_name})")]
pub struct AuthorSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileFeed {
    pub profile: AuthorSummary,
    pub posts_count: u64,
    #[serde(default)]
    pub following: Option<bool>,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDetail {
    pub profile: AuthorSummary,
    pub posts_count: u64,
    pub post: PostView,
    pub comments: Vec<Comment>,
}

/// Partial post edit. `Some(None)` clears the group or image.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_serializes_only_touched_fields() {
        let edit = PostEdit {
            group: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&edit).unwrap(), r#"{"group":null}"#);
    }

    #[test]
    fn anonymous_profile_has_no_following_flag() {
        let raw = r#"{
            "profile": {"username": "bob", "first_name": "", "last_name": ""},
            "posts_count": 0,
            "page": {"items": [], "number": 1, "num_pages": 1, "count": 0,
                     "page_size": 10, "has_next": false, "has_previous": false}
        }"#;
        let feed: ProfileFeed = serde_json::from_str(raw).unwrap();
        assert_eq!(feed.following, None);
        assert_eq!(feed.page.num_pages, 1);
    }
}
