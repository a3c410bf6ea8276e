use std::sync::Arc;

use tracing::instrument;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::error::DomainError;
use crate::domain::user::Principal;

#[derive(Clone)]
pub struct CommentService<C: CommentRepository + 'static, P: PostRepository + 'static> {
    repo: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    pub fn new(repo: Arc<C>, posts: Arc<P>) -> Self {
        Self { repo, posts }
    }

    /// Anyone signed in may comment on any existing post.
    #[instrument(skip(self, actor, text), fields(username = %actor.username))]
    pub async fn add_comment(
        &self,
        actor: &Principal,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let comment = NewComment::new(post_id, actor.id, text)?;
        self.ensure_post(post_id).await?;
        self.repo.create(comment).await
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.ensure_post(post_id).await?;
        self.repo.list_for_post(post_id).await
    }

    async fn ensure_post(&self, post_id: i64) -> Result<(), DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .map(|_| ())
            .ok_or(DomainError::PostNotFound(post_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::domain::post::NewPost;
    use crate::domain::user::User;

    async fn user(store: &InMemoryStore, name: &str) -> Principal {
        let user = User::new(
            name.into(),
            format!("{name}@example.com"),
            String::new(),
            String::new(),
            "hash".into(),
        );
        UserRepository::create(store, user).await.unwrap().principal()
    }

    #[tokio::test]
    async fn anyone_can_comment_and_list_keeps_order() {
        let store = Arc::new(InMemoryStore::new());
        let comments = CommentService::new(store.clone(), store.clone());
        let bob = user(&store, "bob").await;
        let alice = user(&store, "alice").await;
        let post = PostRepository::create(
            store.as_ref(),
            NewPost::new(bob.id, "hello", None, None).unwrap(),
        )
        .await
        .unwrap();

        let first = comments.add_comment(&alice, post.id, "nice").await.unwrap();
        comments.add_comment(&bob, post.id, " thanks ").await.unwrap();

        assert_eq!(first.author, "alice");
        assert_eq!(first.post_id, post.id);

        let listed = comments.list_comments(post.id).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["nice", "thanks"]);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let comments = CommentService::new(store.clone(), store.clone());
        let alice = user(&store, "alice").await;

        assert!(matches!(
            comments.add_comment(&alice, 42, "hi").await,
            Err(DomainError::PostNotFound(42))
        ));
        assert!(matches!(
            comments.list_comments(42).await,
            Err(DomainError::PostNotFound(42))
        ));
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let comments = CommentService::new(store.clone(), store.clone());
        let alice = user(&store, "alice").await;
        let post = PostRepository::create(
            store.as_ref(),
            NewPost::new(alice.id, "hello", None, None).unwrap(),
        )
        .await
        .unwrap();

        let err = comments.add_comment(&alice, post.id, "").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
        assert_eq!(store.comment_count(), 0);
    }
}
