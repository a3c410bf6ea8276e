use crate::data::{internal, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::group::{Group, NewGroup};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
    /// Saves title, slug and description of an existing group.
    async fn update(&self, group: &Group) -> Result<Option<Group>, DomainError>;
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn slug_conflict(slug: &str, e: sqlx::Error) -> DomainError {
    if violated_constraint(&e).as_deref() == Some("groups_slug_key") {
        DomainError::validation("title", format!("group with slug '{}' already exists", slug))
    } else {
        internal("failed to save group", e)
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let created = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(&group.slug, e))?;

        info!(group_id = created.id, slug = %created.slug, "group created");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal(&format!("db error find group {}", id), e))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| internal(&format!("db error find group by slug {}", slug), e))
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| internal("db error while listing groups", e))
    }

    async fn update(&self, group: &Group) -> Result<Option<Group>, DomainError> {
        let updated = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET title = $1, slug = $2, description = $3
            WHERE id = $4
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| slug_conflict(&group.slug, e))?;

        if updated.is_some() {
            info!(group_id = group.id, slug = %group.slug, "group updated");
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| internal(&format!("failed to delete group {}", id), e))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(group_id = id, "group deleted");
        }
        Ok(removed)
    }
}
