mod error;
mod http_client;
pub mod models;

pub use error::YatubeClientError;
pub use http_client::{TokenStore, YatubeClient};
pub use models::*;

use async_trait::async_trait;

/// Operations exposed by the Yatube JSON API.
#[async_trait(?Send)]
pub trait YatubeApi {
    async fn signup(
        &mut self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(), YatubeClientError>;
    async fn login(&mut self, username: String, password: String) -> Result<(), YatubeClientError>;
    async fn refresh(&mut self) -> Result<(), YatubeClientError>;

    async fn home_feed(&self, page: Option<u32>) -> Result<Page<PostView>, YatubeClientError>;
    async fn group_feed(&self, slug: &str, page: Option<u32>)
    -> Result<GroupFeed, YatubeClientError>;
    async fn profile(&self, username: &str, page: Option<u32>)
    -> Result<ProfileFeed, YatubeClientError>;
    async fn follow_feed(&self, page: Option<u32>) -> Result<Page<PostView>, YatubeClientError>;
    async fn post_detail(&self, username: &str, post_id: i64)
    -> Result<PostDetail, YatubeClientError>;

    async fn create_post(
        &self,
        text: String,
        group: Option<i64>,
        image: Option<String>,
    ) -> Result<PostView, YatubeClientError>;
    async fn edit_post(&self, id: i64, edit: PostEdit) -> Result<PostView, YatubeClientError>;
    async fn delete_post(&self, id: i64) -> Result<(), YatubeClientError>;

    async fn add_comment(&self, post_id: i64, text: String) -> Result<Comment, YatubeClientError>;
    async fn comments(&self, post_id: i64) -> Result<Vec<Comment>, YatubeClientError>;

    async fn groups(&self) -> Result<Vec<Group>, YatubeClientError>;

    async fn follow(&self, username: String) -> Result<Follow, YatubeClientError>;
    async fn unfollow(&self, username: &str) -> Result<(), YatubeClientError>;
    async fn follows(&self, search: Option<String>) -> Result<Vec<Follow>, YatubeClientError>;
}
