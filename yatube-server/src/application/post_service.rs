use std::sync::Arc;

use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{PostFilter, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::page::{Page, PageNumber, Paginator};
use crate::domain::post::{NewPost, Post, PostChanges, PostView};
use crate::domain::user::Principal;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct PostService<R: PostRepository + 'static, G: GroupRepository + 'static> {
    repo: Arc<R>,
    groups: Arc<G>,
    page_size: u32,
}

impl<R, G> PostService<R, G>
where
    R: PostRepository + 'static,
    G: GroupRepository + 'static,
{
    pub fn new(repo: Arc<R>, groups: Arc<G>, page_size: u32) -> Self {
        Self {
            repo,
            groups,
            page_size,
        }
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn get_post_view(&self, id: i64) -> Result<PostView, DomainError> {
        self.repo
            .find_view(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// Paginated listing, optionally restricted to one group id.
    pub async fn get_posts(
        &self,
        group_id: Option<i64>,
        page: PageNumber,
    ) -> Result<Page<PostView>, DomainError> {
        let filter = group_id.map(PostFilter::Group).unwrap_or(PostFilter::All);
        let paginator = Paginator::new(self.repo.count(filter).await?, self.page_size);
        let number = paginator.resolve(page);
        let (limit, offset) = paginator.window(number);
        let posts = self.repo.list(filter, limit, offset).await?;
        Ok(paginator.page(number, posts))
    }

    #[instrument(skip(self, actor, text, image), fields(username = %actor.username))]
    pub async fn create_post(
        &self,
        actor: &Principal,
        text: &str,
        group_id: Option<i64>,
        image: Option<String>,
    ) -> Result<Post, DomainError> {
        let post = NewPost::new(actor.id, text, group_id, image)?;
        self.ensure_group(post.group_id).await?;
        self.repo.create(post).await
    }

    #[instrument(skip(self, actor, changes), fields(username = %actor.username))]
    pub async fn update_post(
        &self,
        actor: &Principal,
        post_id: i64,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let changes = changes.validated()?;
        let current = self.get_post(post_id).await?;
        current.ensure_author(actor)?;
        if let Some(group_id) = changes.group_id {
            self.ensure_group(group_id).await?;
        }

        let post = self.repo.update_post(post_id, actor.id, &changes).await?;
        info!(post_id, "post edited by author");
        Ok(post)
    }

    #[instrument(skip(self, actor), fields(username = %actor.username))]
    pub async fn delete_post(&self, actor: &Principal, post_id: i64) -> Result<(), DomainError> {
        let current = self.get_post(post_id).await?;
        current.ensure_author(actor)?;
        self.repo.delete_post(post_id, actor.id).await
    }

    async fn ensure_group(&self, group_id: Option<i64>) -> Result<(), DomainError> {
        let Some(id) = group_id else {
            return Ok(());
        };
        match self.groups.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("group", "Select a valid choice.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::comment_repository::CommentRepository;
    use crate::data::memory::InMemoryStore;
    use crate::data::user_repository::UserRepository;
    use crate::domain::comment::NewComment;
    use crate::domain::group::NewGroup;
    use crate::domain::user::User;

    struct Fixture {
        store: Arc<InMemoryStore>,
        posts: PostService<InMemoryStore, InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let posts = PostService::new(store.clone(), store.clone(), 10);
        Fixture { store, posts }
    }

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
    async fn create_requires_existing_group() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;

        let err = f.posts.create_post(&bob, "hello", Some(404), None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "group", .. }));

        let group = GroupRepository::create(
            f.store.as_ref(),
            NewGroup::new("Tech".into(), String::new()).unwrap(),
        )
        .await
        .unwrap();
        let post = f
            .posts
            .create_post(&bob, "hello", Some(group.id), Some("posts/a.png".into()))
            .await
            .unwrap();
        assert_eq!(post.author_id, bob.id);
        assert_eq!(post.group_id, Some(group.id));
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let err = f.posts.create_post(&bob, "  ", None, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
    }

    #[tokio::test]
    async fn edits_never_touch_author_or_pub_date() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let original = f.posts.create_post(&bob, "v1", None, None).await.unwrap();

        for text in ["v2", "v3", "v4"] {
            let changes = PostChanges {
                text: Some(text.into()),
                ..Default::default()
            };
            let edited = f.posts.update_post(&bob, original.id, changes).await.unwrap();
            assert_eq!(edited.text, text);
            assert_eq!(edited.author_id, original.author_id);
            assert_eq!(edited.pub_date, original.pub_date);
        }
    }

    #[tokio::test]
    async fn stranger_cannot_edit_or_delete() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let carol = user(&f.store, "carol").await;
        let post = f.posts.create_post(&bob, "hello", None, None).await.unwrap();

        let changes = PostChanges {
            text: Some("hijacked".into()),
            image: Some(Some("evil.png".into())),
            ..Default::default()
        };
        let err = f.posts.update_post(&carol, post.id, changes).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let err = f.posts.delete_post(&carol, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let stored = f.posts.get_post(post.id).await.unwrap();
        assert_eq!(stored, post);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        assert!(matches!(
            f.posts.delete_post(&bob, 999).await,
            Err(DomainError::PostNotFound(999))
        ));
        assert!(matches!(
            f.posts.update_post(&bob, 999, PostChanges::default()).await,
            Err(DomainError::PostNotFound(999))
        ));
    }

    #[tokio::test]
    async fn delete_cascades_to_own_comments_only() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let alice = user(&f.store, "alice").await;
        let doomed = f.posts.create_post(&bob, "doomed", None, None).await.unwrap();
        let kept = f.posts.create_post(&bob, "kept", None, None).await.unwrap();

        for (post_id, text) in [(doomed.id, "a"), (doomed.id, "b"), (kept.id, "c")] {
            CommentRepository::create(
                f.store.as_ref(),
                NewComment::new(post_id, alice.id, text).unwrap(),
            )
            .await
            .unwrap();
        }

        f.posts.delete_post(&bob, doomed.id).await.unwrap();

        assert!(matches!(
            f.posts.get_post(doomed.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        let remaining = f.store.list_for_post(kept.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(f.store.comment_count(), 1);
    }

    #[tokio::test]
    async fn group_can_be_cleared_on_edit() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let group = GroupRepository::create(
            f.store.as_ref(),
            NewGroup::new("Tech".into(), String::new()).unwrap(),
        )
        .await
        .unwrap();
        let post = f
            .posts
            .create_post(&bob, "hello", Some(group.id), None)
            .await
            .unwrap();

        let edited = f
            .posts
            .update_post(
                &bob,
                post.id,
                PostChanges {
                    group_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.group_id, None);
        assert_eq!(edited.text, "hello");
    }

    #[tokio::test]
    async fn listing_filters_by_group() {
        let f = fixture();
        let bob = user(&f.store, "bob").await;
        let group = GroupRepository::create(
            f.store.as_ref(),
            NewGroup::new("Tech".into(), String::new()).unwrap(),
        )
        .await
        .unwrap();
        f.posts.create_post(&bob, "in", Some(group.id), None).await.unwrap();
        f.posts.create_post(&bob, "out", None, None).await.unwrap();

        let page = f.posts.get_posts(Some(group.id), PageNumber::First).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0].text, "in");

        let all = f.posts.get_posts(None, PageNumber::First).await.unwrap();
        assert_eq!(all.count, 2);
    }
}
