use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::follow::FollowSearch;
use crate::presentation::dto::{FollowQuery, FollowRequest};
use crate::presentation::handlers::Follows;
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("")]
pub async fn list_follows(
    _user: AuthenticatedUser,
    follows: web::Data<Follows>,
    query: web::Query<FollowQuery>,
) -> Result<HttpResponse, DomainError> {
    let search = FollowSearch {
        term: query.into_inner().search,
    };
    Ok(HttpResponse::Ok().json(follows.list_follows(search).await?))
}

#[post("")]
pub async fn follow(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    follows: web::Data<Follows>,
    payload: web::Json<FollowRequest>,
) -> Result<HttpResponse, DomainError> {
    let edge = follows.follow(&user, &payload.following).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        following = %edge.following,
        "follow created"
    );

    Ok(HttpResponse::Created().json(edge))
}

#[delete("/{username}")]
pub async fn unfollow(
    AuthenticatedUser(user): AuthenticatedUser,
    follows: web::Data<Follows>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    follows.unfollow(&user, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
