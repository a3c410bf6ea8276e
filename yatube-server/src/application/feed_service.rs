use std::sync::Arc;

use serde::Serialize;

use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{PostFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::page::{Page, PageNumber, Paginator};
use crate::domain::post::PostView;
use crate::domain::user::{Principal, User};

#[derive(Debug, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for AuthorSummary {
    fn from(u: &User) -> Self {
        AuthorSummary {
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileFeed {
    pub profile: AuthorSummary,
    pub posts_count: u64,
    /// Only reported to signed-in viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub profile: AuthorSummary,
    pub posts_count: u64,
    pub post: PostView,
    pub comments: Vec<Comment>,
}

pub struct FeedService<P, G, U, F, C>
where
    P: PostRepository + 'static,
    G: GroupRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    C: CommentRepository + 'static,
{
    posts: Arc<P>,
    groups: Arc<G>,
    users: Arc<U>,
    follows: Arc<F>,
    comments: Arc<C>,
    page_size: u32,
}

impl<P, G, U, F, C> FeedService<P, G, U, F, C>
where
    P: PostRepository + 'static,
    G: GroupRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    C: CommentRepository + 'static,
{
    pub fn new(
        posts: Arc<P>,
        groups: Arc<G>,
        users: Arc<U>,
        follows: Arc<F>,
        comments: Arc<C>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            follows,
            comments,
            page_size,
        }
    }

    pub async fn home(&self, page: PageNumber) -> Result<Page<PostView>, DomainError> {
        self.paginate(PostFilter::All, page).await
    }

    pub async fn group(&self, slug: &str, page: PageNumber) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))?;
        let page = self.paginate(PostFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&Principal>,
        page: PageNumber,
    ) -> Result<ProfileFeed, DomainError> {
        let author = self.author(username).await?;
        let page = self.paginate(PostFilter::Author(author.id), page).await?;
        let following = match viewer {
            Some(viewer) => Some(self.follows.exists(viewer.id, author.id).await?),
            None => None,
        };

        Ok(ProfileFeed {
            profile: AuthorSummary::from(&author),
            posts_count: page.count,
            following,
            page,
        })
    }

    /// Posts of everyone the viewer follows; no follows means an empty feed.
    pub async fn following(
        &self,
        viewer: &Principal,
        page: PageNumber,
    ) -> Result<Page<PostView>, DomainError> {
        self.paginate(PostFilter::FollowedBy(viewer.id), page).await
    }

    pub async fn post_detail(&self, username: &str, post_id: i64) -> Result<PostDetail, DomainError> {
        let author = self.author(username).await?;
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .filter(|p| p.author_id == author.id)
            .ok_or(DomainError::PostNotFound(post_id))?;
        let view = self
            .posts
            .find_view(post.id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        let posts_count = self.posts.count(PostFilter::Author(author.id)).await?;
        let comments = self.comments.list_for_post(post.id).await?;

        Ok(PostDetail {
            profile: AuthorSummary::from(&author),
            posts_count,
            post: view,
            comments,
        })
    }

    async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        page: PageNumber,
    ) -> Result<Page<PostView>, DomainError> {
        let paginator = Paginator::new(self.posts.count(filter).await?, self.page_size);
        let number = paginator.resolve(page);
        let (limit, offset) = paginator.window(number);
        let items = self.posts.list(filter, limit, offset).await?;
        Ok(paginator.page(number, items))
    }
}
