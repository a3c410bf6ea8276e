use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::infrastructure::security::TokenKind;
use crate::presentation::dto::{
    AccessTokenResponse, RefreshRequest, RegisterRequest, TokenPairResponse, TokenRequest,
};
use crate::presentation::handlers::Auth;
use crate::presentation::utils::request_id;

#[post("/auth/signup")]
pub async fn signup(
    req: HttpRequest,
    service: web::Data<Auth>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let user = service.register(payload.into_inner().into()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        username = %user.username,
        "user registered"
    );

    let pair = service.issue_pair(user.id)?;
    let expires_in = service.keys().ttl(TokenKind::Access);
    Ok(HttpResponse::Created().json(TokenPairResponse::new(pair, expires_in)))
}

#[post("/token")]
pub async fn token(
    req: HttpRequest,
    service: web::Data<Auth>,
    payload: web::Json<TokenRequest>,
) -> Result<HttpResponse, DomainError> {
    let pair = service.login(&payload.username, &payload.password).await?;

    info!(
        request_id = %request_id(&req),
        username = %payload.username,
        "token pair issued"
    );

    let expires_in = service.keys().ttl(TokenKind::Access);
    Ok(HttpResponse::Ok().json(TokenPairResponse::new(pair, expires_in)))
}

#[post("/token/refresh")]
pub async fn refresh(
    service: web::Data<Auth>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, DomainError> {
    let access = service.refresh(&payload.refresh).await?;
    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access,
        access_expires_in: service.keys().ttl(TokenKind::Access),
        token_type: "Bearer",
    }))
}
