use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::dto::CreateCommentRequest;
use crate::presentation::handlers::Comments;
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("/posts/{id}/comments")]
pub async fn list_comments(
    comments: web::Data<Comments>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let items = comments.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(items))
}

#[post("/posts/{id}/comments")]
pub async fn add_comment(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    comments: web::Data<Comments>,
    path: web::Path<i64>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = comments.add_comment(&user, post_id, &payload.text).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        comment_id = comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}
