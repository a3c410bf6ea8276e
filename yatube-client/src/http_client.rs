use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::YatubeClientError;
use crate::models::{
    Comment, Follow, Group, GroupFeed, Page, PostDetail, PostEdit, PostView, ProfileFeed, Tokens,
};
use crate::YatubeApi;

const TOKEN_FILE: &str = ".yatube_token";

/// Access and refresh tokens persisted between CLI invocations.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct StoredTokens {
    access: String,
    refresh: Option<String>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Option<StoredTokens> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), YatubeClientError> {
        let raw = serde_json::to_string(tokens)
            .map_err(|e| YatubeClientError::InvalidRequest(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(TOKEN_FILE)
    }
}

#[derive(Clone)]
pub struct YatubeClient {
    client: Arc<Client>,
    base_url: String,
    store: TokenStore,
}

impl YatubeClient {
    pub fn connect(endpoint: &str, store: TokenStore) -> Result<Self, YatubeClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url,
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn page_url(&self, path: &str, page: Option<u32>) -> String {
        match page {
            Some(page) => format!("{}?page={}", self.url(path), page),
            None => self.url(path),
        }
    }

    fn remember(&self, tokens: Tokens) -> Result<(), YatubeClientError> {
        // refresh-токен приходит не всегда, старый сохраняем
        let refresh = tokens
            .refresh
            .or_else(|| self.store.load().and_then(|t| t.refresh));
        self.store.save(&StoredTokens {
            access: tokens.access,
            refresh,
        })
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, YatubeClientError> {
        let tokens = self.store.load().ok_or(YatubeClientError::Unauthorized)?;
        if tokens.access.is_empty() {
            return Err(YatubeClientError::Unauthorized);
        }
        Ok(req.bearer_auth(tokens.access))
    }

    /// Attaches the token when one is stored; anonymous otherwise.
    fn maybe_authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.store.load() {
            Some(tokens) if !tokens.access.is_empty() => req.bearer_auth(tokens.access),
            _ => req,
        }
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, YatubeClientError> {
        let resp = req.send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn send_empty(req: RequestBuilder) -> Result<(), YatubeClientError> {
        Self::check(req.send().await?).await?;
        Ok(())
    }

    async fn check(resp: Response) -> Result<Response, YatubeClientError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(YatubeClientError::from_http_response(resp).await)
        }
    }
}

#[async_trait(?Send)]
impl YatubeApi for YatubeClient {
    async fn signup(
        &mut self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(), YatubeClientError> {
        let req = self
            .client
            .post(self.url("/auth/signup"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }));
        let tokens: Tokens = Self::send(req).await?;
        self.remember(tokens)
    }

    async fn login(&mut self, username: String, password: String) -> Result<(), YatubeClientError> {
        let req = self
            .client
            .post(self.url("/token"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }));
        let tokens: Tokens = Self::send(req).await?;
        self.remember(tokens)
    }

    async fn refresh(&mut self) -> Result<(), YatubeClientError> {
        let refresh = self
            .store
            .load()
            .and_then(|t| t.refresh)
            .ok_or(YatubeClientError::Unauthorized)?;
        let req = self
            .client
            .post(self.url("/token/refresh"))
            .json(&serde_json::json!({ "refresh": refresh }));
        let tokens: Tokens = Self::send(req).await?;
        self.remember(tokens)
    }

    async fn home_feed(&self, page: Option<u32>) -> Result<Page<PostView>, YatubeClientError> {
        Self::send(self.client.get(self.page_url("/feed", page))).await
    }

    async fn group_feed(
        &self,
        slug: &str,
        page: Option<u32>,
    ) -> Result<GroupFeed, YatubeClientError> {
        let url = self.page_url(&format!("/feed/group/{slug}"), page);
        Self::send(self.client.get(url)).await
    }

    async fn profile(
        &self,
        username: &str,
        page: Option<u32>,
    ) -> Result<ProfileFeed, YatubeClientError> {
        let url = self.page_url(&format!("/feed/{username}"), page);
        Self::send(self.maybe_authorized(self.client.get(url))).await
    }

    async fn follow_feed(&self, page: Option<u32>) -> Result<Page<PostView>, YatubeClientError> {
        let req = self.authorized(self.client.get(self.page_url("/feed/follow", page)))?;
        Self::send(req).await
    }

    async fn post_detail(
        &self,
        username: &str,
        post_id: i64,
    ) -> Result<PostDetail, YatubeClientError> {
        Self::send(self.client.get(self.url(&format!("/feed/{username}/{post_id}")))).await
    }

    async fn create_post(
        &self,
        text: String,
        group: Option<i64>,
        image: Option<String>,
    ) -> Result<PostView, YatubeClientError> {
        let req = self.authorized(self.client.post(self.url("/posts")))?.json(
            &serde_json::json!({
                "text": text,
                "group": group,
                "image": image,
            }),
        );
        Self::send(req).await
    }

    async fn edit_post(&self, id: i64, edit: PostEdit) -> Result<PostView, YatubeClientError> {
        let req = self
            .authorized(self.client.patch(self.url(&format!("/posts/{id}"))))?
            .json(&edit);
        Self::send(req).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), YatubeClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("/posts/{id}"))))?;
        Self::send_empty(req).await
    }

    async fn add_comment(&self, post_id: i64, text: String) -> Result<Comment, YatubeClientError> {
        let req = self
            .authorized(
                self.client
                    .post(self.url(&format!("/posts/{post_id}/comments"))),
            )?
            .json(&serde_json::json!({ "text": text }));
        Self::send(req).await
    }

    async fn comments(&self, post_id: i64) -> Result<Vec<Comment>, YatubeClientError> {
        Self::send(self.client.get(self.url(&format!("/posts/{post_id}/comments")))).await
    }

    async fn groups(&self) -> Result<Vec<Group>, YatubeClientError> {
        Self::send(self.client.get(self.url("/group"))).await
    }

    async fn follow(&self, username: String) -> Result<Follow, YatubeClientError> {
        let req = self
            .authorized(self.client.post(self.url("/follow")))?
            .json(&serde_json::json!({ "following": username }));
        Self::send(req).await
    }

    async fn unfollow(&self, username: &str) -> Result<(), YatubeClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("/follow/{username}"))))?;
        Self::send_empty(req).await
    }

    async fn follows(&self, search: Option<String>) -> Result<Vec<Follow>, YatubeClientError> {
        let mut req = self.authorized(self.client.get(self.url("/follow")))?;
        if let Some(search) = search {
            req = req.query(&[("search", search)]);
        }
        Self::send(req).await
    }
}
