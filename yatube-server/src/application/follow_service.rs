use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::follow::{Follow, FollowSearch, NewFollow, already_following};
use crate::domain::user::{Principal, User};

#[derive(Clone)]
pub struct FollowService<F: FollowRepository + 'static, U: UserRepository + 'static> {
    repo: Arc<F>,
    users: Arc<U>,
}

impl<F, U> FollowService<F, U>
where
    F: FollowRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(repo: Arc<F>, users: Arc<U>) -> Self {
        Self { repo, users }
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn follow(&self, user: &Principal, target: &str) -> Result<Follow, DomainError> {
        let author = self.resolve(target).await?;
        let edge = NewFollow::new(user, &author)?;
        if self.repo.exists(edge.user_id, edge.author_id).await? {
            return Err(already_following());
        }
        self.repo.create(edge).await
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn unfollow(&self, user: &Principal, target: &str) -> Result<(), DomainError> {
        let author = self.resolve(target).await?;
        if !self.repo.delete(user.id, author.id).await? {
            return Err(DomainError::FollowNotFound {
                user: user.username.clone(),
                author: author.username,
            });
        }
        info!(following = %author.username, "unfollowed");
        Ok(())
    }

    pub async fn list_follows(&self, search: FollowSearch) -> Result<Vec<Follow>, DomainError> {
        self.repo.list(&search).await
    }

    async fn resolve(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }
}
