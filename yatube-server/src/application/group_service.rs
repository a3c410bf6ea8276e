use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::group_repository::GroupRepository;
use crate::domain::error::DomainError;
use crate::domain::group::{Group, GroupChanges, NewGroup};
use crate::domain::user::Principal;

/// Groups are readable by everyone and writable by administrators only.
#[derive(Clone)]
pub struct GroupService<G: GroupRepository + 'static> {
    repo: Arc<G>,
}

impl<G> GroupService<G>
where
    G: GroupRepository + 'static,
{
    pub fn new(repo: Arc<G>) -> Self {
        Self { repo }
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.repo.list().await
    }

    pub async fn get_group(&self, id: i64) -> Result<Group, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(id.to_string()))
    }

    pub async fn get_group_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))
    }

    #[instrument(skip(self, actor, description), fields(username = %actor.username))]
    pub async fn create_group(
        &self,
        actor: &Principal,
        title: String,
        description: String,
    ) -> Result<Group, DomainError> {
        ensure_admin(actor)?;
        let group = NewGroup::new(title, description)?;
        self.repo.create(group).await
    }

    #[instrument(skip(self, actor, changes), fields(username = %actor.username))]
    pub async fn update_group(
        &self,
        actor: &Principal,
        id: i64,
        changes: GroupChanges,
    ) -> Result<Group, DomainError> {
        ensure_admin(actor)?;
        let mut group = self.get_group(id).await?;
        group.apply(changes)?;
        self.repo
            .update(&group)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(id.to_string()))
    }

    #[instrument(skip(self, actor), fields(username = %actor.username))]
    pub async fn delete_group(&self, actor: &Principal, id: i64) -> Result<(), DomainError> {
        ensure_admin(actor)?;
        if !self.repo.delete(id).await? {
            return Err(DomainError::GroupNotFound(id.to_string()));
        }
        info!(group_id = id, "group removed with its posts");
        Ok(())
    }
}

fn ensure_admin(actor: &Principal) -> Result<(), DomainError> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
