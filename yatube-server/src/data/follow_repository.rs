use crate::data::{internal, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::follow::{Follow, FollowSearch, NewFollow, SELF_FOLLOW, already_following};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Fails with a validation error if the edge already exists.
    async fn create(&self, follow: NewFollow) -> Result<Follow, DomainError>;
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    /// Returns `false` when there was no such edge.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    /// Newest first.
    async fn list(&self, search: &FollowSearch) -> Result<Vec<Follow>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn create(&self, follow: NewFollow) -> Result<Follow, DomainError> {
        // уникальный индекс закрывает гонку двух одинаковых запросов
        let created = sqlx::query_as::<_, Follow>(
            r#"
            WITH inserted AS (
                INSERT INTO follows (user_id, author_id)
                VALUES ($1, $2)
                RETURNING id, user_id, author_id, created_at
            )
            SELECT i.id, i.user_id, fu.username AS "user", i.author_id, fa.username AS following, i.created_at
            FROM inserted i
            JOIN users fu ON fu.id = i.user_id
            JOIN users fa ON fa.id = i.author_id
            "#,
        )
        .bind(follow.user_id)
        .bind(follow.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some("follows_user_author_key") => already_following(),
            Some("follows_no_self_follow") => DomainError::validation("following", SELF_FOLLOW),
            _ => internal("failed to create follow", e),
        })?;

        info!(user = %created.user, following = %created.following, "follow created");
        Ok(created)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| internal("db error checking follow", e))
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| internal("failed to delete follow", e))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, author_id = %author_id, "follow deleted");
        }
        Ok(removed)
    }

    async fn list(&self, search: &FollowSearch) -> Result<Vec<Follow>, DomainError> {
        sqlx::query_as::<_, Follow>(
            r#"
            SELECT f.id, f.user_id, fu.username AS "user", f.author_id, fa.username AS following, f.created_at
            FROM follows f
            JOIN users fu ON fu.id = f.user_id
            JOIN users fa ON fa.id = f.author_id
            WHERE $1::text IS NULL
               OR lower(fu.username) = lower($1)
               OR lower(fa.username) = lower($1)
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(&search.term)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| internal("db error while listing follows", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::follow::ALREADY_FOLLOWING;
    use crate::infrastructure::database::test_support::TestDatabase;

    fn message(err: DomainError) -> String {
        match err {
            DomainError::Validation {
                field: "following",
                message,
            } => message,
            other => panic!("expected validation on following, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_and_self_follow_hit_constraints() {
        let Some(db) = TestDatabase::start().await else {
            return;
        };
        let alice = db.user("alice").await;
        let bob = db.user("bob").await;
        let repo = PostgresFollowRepository::new(db.pool.clone());
        let edge = NewFollow::new(&alice.principal(), &bob).unwrap();

        let created = repo.create(edge.clone()).await.unwrap();
        assert_eq!(created.user, alice.username);
        assert_eq!(created.following, bob.username);

        let err = repo.create(edge).await.unwrap_err();
        assert_eq!(message(err), ALREADY_FOLLOWING);

        // bypasses NewFollow::new to reach the CHECK constraint
        let err = repo
            .create(NewFollow {
                user_id: alice.id,
                author_id: alice.id,
            })
            .await
            .unwrap_err();
        assert_eq!(message(err), SELF_FOLLOW);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_matches_either_side_case_insensitively() {
        let Some(db) = TestDatabase::start().await else {
            return;
        };
        let alice = db.user("alice").await;
        let bob = db.user("bob").await;
        let carol = db.user("carol").await;
        let repo = PostgresFollowRepository::new(db.pool.clone());
        repo.create(NewFollow::new(&alice.principal(), &bob).unwrap())
            .await
            .unwrap();
        repo.create(NewFollow::new(&carol.principal(), &alice).unwrap())
            .await
            .unwrap();

        let search = FollowSearch {
            term: Some(alice.username.to_uppercase()),
        };
        let found = repo.list(&search).await.unwrap();
        assert_eq!(found.len(), 2);
        // newest first
        assert_eq!(found[0].user, carol.username);
        assert_eq!(found[0].following, alice.username);
        assert_eq!(found[1].following, bob.username);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_reports_whether_an_edge_existed() {
        let Some(db) = TestDatabase::start().await else {
            return;
        };
        let alice = db.user("alice").await;
        let bob = db.user("bob").await;
        let repo = PostgresFollowRepository::new(db.pool.clone());
        repo.create(NewFollow::new(&alice.principal(), &bob).unwrap())
            .await
            .unwrap();

        assert!(repo.exists(alice.id, bob.id).await.unwrap());
        assert!(!repo.exists(bob.id, alice.id).await.unwrap());
        assert!(repo.delete(alice.id, bob.id).await.unwrap());
        assert!(!repo.delete(alice.id, bob.id).await.unwrap());
        assert!(!repo.exists(alice.id, bob.id).await.unwrap());
    }
}
