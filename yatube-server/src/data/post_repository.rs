use crate::data::{internal, violated_constraint};
use crate::domain::error::DomainError;
use crate::domain::group::GroupRef;
use crate::domain::post::{NewPost, Post, PostChanges, PostView};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

/// Which posts a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}

impl PostFilter {
    fn binds(&self) -> (Option<i64>, Option<Uuid>, Option<Uuid>) {
        match *self {
            PostFilter::All => (None, None, None),
            PostFilter::Group(id) => (Some(id), None, None),
            PostFilter::Author(id) => (None, Some(id), None),
            PostFilter::FollowedBy(id) => (None, None, Some(id)),
        }
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn find_view(&self, id: i64) -> Result<Option<PostView>, DomainError>;
    /// Updates the post only if `author_id` owns it.
    async fn update_post(
        &self,
        id: i64,
        author_id: Uuid,
        changes: &PostChanges,
    ) -> Result<Post, DomainError>;
    /// Deletes the post and its comments only if `author_id` owns it.
    async fn delete_post(&self, id: i64, author_id: Uuid) -> Result<(), DomainError>;
    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError>;
    /// Newest first, ties broken by id.
    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes "no such post" from "not yours" after a guarded write touched nothing.
    async fn ownership_failure(&self, id: i64) -> DomainError {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await;

        match exists {
            Ok(true) => DomainError::Forbidden,
            Ok(false) => DomainError::PostNotFound(id),
            Err(e) => internal(&format!("db error checking post {}", id), e),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    author: String,
    group_id: Option<i64>,
    group_title: Option<String>,
    group_slug: Option<String>,
    comment_count: i64,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        let group = match (row.group_id, row.group_title, row.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
            _ => None,
        };
        PostView {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author: row.author,
            group,
            image: row.image,
            comment_count: row.comment_count,
        }
    }
}

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.image,
           u.username AS author,
           g.id AS group_id, g.title AS group_title, g.slug AS group_slug,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const FILTER_WHERE: &str = r#"
    WHERE ($1::bigint IS NULL OR p.group_id = $1)
      AND ($2::uuid IS NULL OR p.author_id = $2)
      AND ($3::uuid IS NULL OR p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $3))
"#;

fn unknown_group(e: sqlx::Error) -> DomainError {
    if violated_constraint(&e).as_deref() == Some("posts_group_id_fkey") {
        DomainError::validation("group", "Select a valid choice.")
    } else {
        internal("failed to save post", e)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (text, pub_date, author_id, group_id, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, text, pub_date, author_id, group_id, image
            "#,
        )
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .fetch_one(&self.pool)
        .await
        .map_err(unknown_group)?;

        info!(post_id = created.id, author_id = %created.author_id, "post created");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, text, pub_date, author_id, group_id, image
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| internal(&format!("db error find_by_id {}", id), e))
    }

    async fn find_view(&self, id: i64) -> Result<Option<PostView>, DomainError> {
        let sql = format!("{VIEW_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| internal(&format!("db error find_view {}", id), e))?;
        Ok(row.map(PostView::from))
    }

    async fn update_post(
        &self,
        id: i64,
        author_id: Uuid,
        changes: &PostChanges,
    ) -> Result<Post, DomainError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                text = COALESCE($1, text),
                group_id = CASE WHEN $2 THEN $3 ELSE group_id END,
                image = CASE WHEN $4 THEN $5 ELSE image END
            WHERE id = $6 AND author_id = $7
            RETURNING id, text, pub_date, author_id, group_id, image
            "#,
        )
        .bind(&changes.text)
        .bind(changes.group_id.is_some())
        .bind(changes.group_id.flatten())
        .bind(changes.image.is_some())
        .bind(changes.image.clone().flatten())
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            unknown_group(e)
        })?;

        match post {
            Some(post) => {
                info!(post_id = %id, "post updated");
                Ok(post)
            }
            None => Err(self.ownership_failure(id).await),
        }
    }

    async fn delete_post(&self, id: i64, author_id: Uuid) -> Result<(), DomainError> {
        // комментарии удаляются каскадом (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| internal(&format!("failed to delete post {}", id), e))?;

        if deleted.rows_affected() == 0 {
            return Err(self.ownership_failure(id).await);
        }

        info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError> {
        let (group_id, author_id, follower_id) = filter.binds();
        let sql = format!("SELECT COUNT(*) FROM posts p {FILTER_WHERE}");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(group_id)
            .bind(author_id)
            .bind(follower_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| internal("db error while counting posts", e))?;
        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError> {
        let (group_id, author_id, follower_id) = filter.binds();
        let sql = format!(
            "{VIEW_SELECT} {FILTER_WHERE} ORDER BY p.pub_date DESC, p.id DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(group_id)
            .bind(author_id)
            .bind(follower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| internal("db error while fetching posts", e))?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }
}
