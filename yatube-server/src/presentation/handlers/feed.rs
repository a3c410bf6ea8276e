use actix_web::{HttpResponse, get, web};

use crate::domain::error::DomainError;
use crate::presentation::dto::PageQuery;
use crate::presentation::handlers::Feeds;
use crate::presentation::utils::{AuthenticatedUser, MaybeUser};

#[get("/feed")]
pub async fn home(
    feeds: web::Data<Feeds>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(feeds.home(query.number()).await?))
}

#[get("/feed/group/{slug}")]
pub async fn group(
    feeds: web::Data<Feeds>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let feed = feeds.group(&path.into_inner(), query.number()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Mounted inside the `/feed/follow` scope, which requires a bearer token.
#[get("")]
pub async fn following(
    AuthenticatedUser(user): AuthenticatedUser,
    feeds: web::Data<Feeds>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(feeds.following(&user, query.number()).await?))
}

#[get("/feed/{username}")]
pub async fn profile(
    MaybeUser(viewer): MaybeUser,
    feeds: web::Data<Feeds>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let feed = feeds
        .profile(&path.into_inner(), viewer.as_ref(), query.number())
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[get("/feed/{username}/{post_id}")]
pub async fn post_detail(
    feeds: web::Data<Feeds>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, DomainError> {
    let (username, post_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(feeds.post_detail(&username, post_id).await?))
}
