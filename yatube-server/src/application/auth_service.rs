use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{Principal, User};
use crate::infrastructure::mail::WelcomeMailer;
use crate::infrastructure::security::{JwtKeys, TokenKind, hash_password, verify_password};

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    fn validate(&self) -> Result<(), DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > 150 {
            return Err(DomainError::validation(
                "username",
                "Required. 150 characters or fewer.",
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            return Err(DomainError::validation(
                "username",
                "Letters, digits and @/./+/-/_ only.",
            ));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email", "Enter a valid email address."));
        }
        if self.password.chars().count() < 8 {
            return Err(DomainError::validation(
                "password",
                "This password is too short. It must contain at least 8 characters.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
    mailer: Arc<dyn WelcomeMailer>,
    admins: Arc<HashSet<String>>,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys, mailer: Arc<dyn WelcomeMailer>) -> Self {
        Self {
            repo,
            keys,
            mailer,
            admins: Arc::default(),
        }
    }

    /// Usernames that are granted administrator rights at signup and on
    /// every authenticated request.
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = String>) -> Self {
        self.admins = Arc::new(admins.into_iter().collect());
        self
    }

    fn is_listed_admin(&self, username: &str) -> bool {
        self.admins.contains(username)
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User, DomainError> {
        registration.validate()?;

        let hash = hash_password(&registration.password)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        let mut user = User::new(
            registration.username.trim().to_string(),
            registration.email.trim().to_lowercase(),
            registration.first_name,
            registration.last_name,
            hash,
        );
        user.is_admin = self.is_listed_admin(&user.username);
        let user = self.repo.create(user).await?;
        if user.is_admin {
            info!(user_id = %user.id, "administrator registered");
        }

        self.mailer.send_welcome(&user).await?;
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        info!(user_id = %user.id, "credentials accepted");
        self.issue_pair(user.id)
    }

    /// Exchanges a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        let user = self.user_from_token(refresh_token, TokenKind::Refresh).await?;
        self.keys
            .generate_token(user.id, TokenKind::Access)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    /// Resolves a bearer access token to the principal it was issued to.
    pub async fn authenticate(&self, access_token: &str) -> Result<Principal, DomainError> {
        let user = self.user_from_token(access_token, TokenKind::Access).await?;
        let mut principal = user.principal();
        // accounts created before they were listed
        principal.is_admin |= self.is_listed_admin(&principal.username);
        Ok(principal)
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, DomainError> {
        let access = self
            .keys
            .generate_token(user_id, TokenKind::Access)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        let refresh = self
            .keys
            .generate_token(user_id, TokenKind::Refresh)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok(TokenPair { access, refresh })
    }

    async fn user_from_token(&self, token: &str, kind: TokenKind) -> Result<User, DomainError> {
        let claims = self
            .keys
            .verify_token(token, kind)
            .map_err(|_| DomainError::Unauthorized)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}
