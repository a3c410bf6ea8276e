pub mod auth;
pub mod comment;
pub mod feed;
pub mod follow;
pub mod group;
pub mod post;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;

/// Storage the handlers are wired against. Unit tests swap in the
/// in-memory store so routes can run without a database.
#[cfg(not(test))]
pub mod backend {
    pub use crate::data::comment_repository::PostgresCommentRepository as Comments;
    pub use crate::data::follow_repository::PostgresFollowRepository as Follows;
    pub use crate::data::group_repository::PostgresGroupRepository as Groups;
    pub use crate::data::post_repository::PostgresPostRepository as Posts;
    pub use crate::data::user_repository::PostgresUserRepository as Users;
}

#[cfg(test)]
pub mod backend {
    pub use crate::data::memory::InMemoryStore as Comments;
    pub use crate::data::memory::InMemoryStore as Follows;
    pub use crate::data::memory::InMemoryStore as Groups;
    pub use crate::data::memory::InMemoryStore as Posts;
    pub use crate::data::memory::InMemoryStore as Users;
}

pub type Auth = AuthService<backend::Users>;
pub type Posts = PostService<backend::Posts, backend::Groups>;
pub type Comments = CommentService<backend::Comments, backend::Posts>;
pub type Groups = GroupService<backend::Groups>;
pub type Follows = FollowService<backend::Follows, backend::Users>;
pub type Feeds = FeedService<
    backend::Posts,
    backend::Groups,
    backend::Users,
    backend::Follows,
    backend::Comments,
>;
