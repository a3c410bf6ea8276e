use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::page::PageNumber;
use crate::presentation::dto::{CreatePostRequest, PostsQuery, UpdatePostRequest};
use crate::presentation::handlers::Posts;
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("/posts")]
pub async fn list_posts(
    posts: web::Data<Posts>,
    query: web::Query<PostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = posts
        .get_posts(query.group, PageNumber::parse(query.page.as_deref()))
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/posts/{id}")]
pub async fn get_post(
    posts: web::Data<Posts>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post_view(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts")]
pub async fn create_post(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    posts: web::Data<Posts>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let post = posts
        .create_post(&user, &payload.text, payload.group, payload.image)
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = post.id,
        "post created"
    );

    let view = posts.get_post_view(post.id).await?;
    Ok(HttpResponse::Created().json(view))
}

#[put("/posts/{id}")]
pub async fn replace_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<Posts>,
    path: web::Path<i64>,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    edit(req, user, posts, path.into_inner(), payload.into_inner(), true).await
}

#[patch("/posts/{id}")]
pub async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<Posts>,
    path: web::Path<i64>,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    edit(req, user, posts, path.into_inner(), payload.into_inner(), false).await
}

async fn edit(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    posts: web::Data<Posts>,
    post_id: i64,
    payload: UpdatePostRequest,
    replace: bool,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.into_changes(replace)?;
    posts.update_post(&user, post_id, changes).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        "post updated"
    );

    let view = posts.get_post_view(post_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    posts: web::Data<Posts>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(&user, post_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id,
        "post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
