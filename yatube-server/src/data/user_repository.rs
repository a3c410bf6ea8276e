use crate::data::{internal, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::user::User;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("users_username_key") {
                error!("username already taken: {}", user.username);
                DomainError::UserAlreadyExists(user.username.clone())
            } else {
                internal("failed to create user", e)
            }
        })?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| internal(&format!("failed to find user by username {}", username), e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| internal(&format!("failed to find user by id {}", id), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::TestDatabase;

    #[tokio::test(flavor = "multi_thread")]
    async fn taken_username_conflicts_and_admin_flag_persists() {
        let Some(db) = TestDatabase::start().await else {
            return;
        };
        let repo = PostgresUserRepository::new(db.pool.clone());
        let existing = db.user("alice").await;

        let twin = User::new(
            existing.username.clone(),
            "other@example.com".into(),
            String::new(),
            String::new(),
            "hash".into(),
        );
        assert!(matches!(
            repo.create(twin).await,
            Err(DomainError::UserAlreadyExists(name)) if name == existing.username
        ));

        let mut admin = User::new(
            format!("root_{}", Uuid::new_v4().simple()),
            "root@example.com".into(),
            String::new(),
            String::new(),
            "hash".into(),
        );
        admin.is_admin = true;
        let admin = repo.create(admin).await.unwrap();

        let by_name = repo.find_by_username(&admin.username).await.unwrap().unwrap();
        assert!(by_name.is_admin);
        let by_id = repo.find_by_id(existing.id).await.unwrap().unwrap();
        assert!(!by_id.is_admin);
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
