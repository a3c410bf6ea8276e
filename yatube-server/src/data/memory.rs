//! In-memory implementation of every repository, sharing one state so that
//! joins and cascades behave like the PostgreSQL schema.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{PostFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use crate::domain::follow::{Follow, FollowSearch, NewFollow, SELF_FOLLOW, already_following};
use crate::domain::group::{Group, GroupRef, NewGroup};
use crate::domain::post::{NewPost, Post, PostChanges, PostView};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    seq: i64,
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn username(&self, id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id == Some(id),
            PostFilter::Author(id) => post.author_id == id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn view(&self, post: &Post) -> PostView {
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(|g| GroupRef {
                id: g.id,
                title: g.title.clone(),
                slug: g.slug.clone(),
            });
        PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: self.username(post.author_id),
            group,
            image: post.image.clone(),
            comment_count: self.comments.iter().filter(|c| c.post_id == post.id).count() as i64,
        }
    }

    fn check_group(&self, group_id: Option<i64>) -> Result<(), DomainError> {
        match group_id {
            Some(id) if !self.groups.iter().any(|g| g.id == id) => {
                Err(DomainError::validation("group", "Select a valid choice."))
            }
            _ => Ok(()),
        }
    }

    fn ownership_failure(&self, id: i64) -> DomainError {
        if self.posts.iter().any(|p| p.id == id) {
            DomainError::Forbidden
        } else {
            DomainError::PostNotFound(id)
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store poisoned")
    }

    pub fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }

    pub fn follow_count(&self) -> usize {
        self.lock().follows.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let mut state = self.lock();
        if state.groups.iter().any(|g| g.slug == group.slug) {
            return Err(DomainError::validation("title", "slug taken"));
        }
        let created = Group {
            id: state.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        state.groups.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        Ok(self.lock().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self.lock().groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn update(&self, group: &Group) -> Result<Option<Group>, DomainError> {
        let mut state = self.lock();
        if state
            .groups
            .iter()
            .any(|g| g.slug == group.slug && g.id != group.id)
        {
            return Err(DomainError::validation("title", "slug taken"));
        }
        match state.groups.iter_mut().find(|g| g.id == group.id) {
            Some(stored) => {
                *stored = group.clone();
                Ok(Some(group.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.groups.len();
        state.groups.retain(|g| g.id != id);
        if state.groups.len() == before {
            return Ok(false);
        }
        let removed: Vec<i64> = state
            .posts
            .iter()
            .filter(|p| p.group_id == Some(id))
            .map(|p| p.id)
            .collect();
        state.posts.retain(|p| p.group_id != Some(id));
        state.comments.retain(|c| !removed.contains(&c.post_id));
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        state.check_group(post.group_id)?;
        let created = Post {
            id: state.next_id(),
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_view(&self, id: i64) -> Result<Option<PostView>, DomainError> {
        let state = self.lock();
        Ok(state.posts.iter().find(|p| p.id == id).map(|p| state.view(p)))
    }

    async fn update_post(
        &self,
        id: i64,
        author_id: Uuid,
        changes: &PostChanges,
    ) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if let Some(group_id) = changes.group_id {
            state.check_group(group_id)?;
        }
        let Some(index) = state
            .posts
            .iter()
            .position(|p| p.id == id && p.author_id == author_id)
        else {
            return Err(state.ownership_failure(id));
        };
        let post = &mut state.posts[index];
        if let Some(text) = &changes.text {
            post.text = text.clone();
        }
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }
        if let Some(image) = &changes.image {
            post.image = image.clone();
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64, author_id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|p| !(p.id == id && p.author_id == author_id));
        if state.posts.len() == before {
            return Err(state.ownership_failure(id));
        }
        state.comments.retain(|c| c.post_id != id);
        Ok(())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError> {
        let state = self.lock();
        Ok(state.posts.iter().filter(|p| state.matches(p, filter)).count() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError> {
        let state = self.lock();
        let mut posts: Vec<&Post> = state
            .posts
            .iter()
            .filter(|p| state.matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|p| state.view(p))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        let created = Comment {
            id: state.next_id(),
            text: comment.text,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author: state.username(comment.author_id),
            created: comment.created,
        };
        state.comments.push(created.clone());
        Ok(created)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn create(&self, follow: NewFollow) -> Result<Follow, DomainError> {
        let mut state = self.lock();
        if follow.user_id == follow.author_id {
            return Err(DomainError::validation("following", SELF_FOLLOW));
        }
        if state
            .follows
            .iter()
            .any(|f| f.user_id == follow.user_id && f.author_id == follow.author_id)
        {
            return Err(already_following());
        }
        let created = Follow {
            id: state.next_id(),
            user_id: follow.user_id,
            user: state.username(follow.user_id),
            author_id: follow.author_id,
            following: state.username(follow.author_id),
            created_at: Utc::now(),
        };
        state.follows.push(created.clone());
        Ok(created)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn list(&self, search: &FollowSearch) -> Result<Vec<Follow>, DomainError> {
        let mut follows: Vec<Follow> = self
            .lock()
            .follows
            .iter()
            .filter(|f| search.matches(f))
            .cloned()
            .collect();
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(follows)
    }
}
