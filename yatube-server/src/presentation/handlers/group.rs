use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::presentation::dto::{CreateGroupRequest, UpdateGroupRequest};
use crate::presentation::handlers::Groups;
use crate::presentation::utils::{AuthenticatedUser, request_id};

#[get("/group")]
pub async fn list_groups(groups: web::Data<Groups>) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(groups.list_groups().await?))
}

#[get("/group/{id}")]
pub async fn get_group(
    groups: web::Data<Groups>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(groups.get_group(path.into_inner()).await?))
}

#[get("/group/slug/{slug}")]
pub async fn get_group_by_slug(
    groups: web::Data<Groups>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(groups.get_group_by_slug(&path.into_inner()).await?))
}

#[post("/group")]
pub async fn create_group(
    req: HttpRequest,
    AuthenticatedUser(user): AuthenticatedUser,
    groups: web::Data<Groups>,
    payload: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let group = groups
        .create_group(&user, payload.title, payload.description)
        .await?;

    info!(
        request_id = %request_id(&req),
        group_id = group.id,
        slug = %group.slug,
        "group created"
    );

    Ok(HttpResponse::Created().json(group))
}

#[put("/group/{id}")]
pub async fn replace_group(
    AuthenticatedUser(user): AuthenticatedUser,
    groups: web::Data<Groups>,
    path: web::Path<i64>,
    payload: web::Json<UpdateGroupRequest>,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.into_inner().into_changes(true)?;
    let group = groups.update_group(&user, path.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(group))
}

#[patch("/group/{id}")]
pub async fn update_group(
    AuthenticatedUser(user): AuthenticatedUser,
    groups: web::Data<Groups>,
    path: web::Path<i64>,
    payload: web::Json<UpdateGroupRequest>,
) -> Result<HttpResponse, DomainError> {
    let changes = payload.into_inner().into_changes(false)?;
    let group = groups.update_group(&user, path.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(group))
}

#[delete("/group/{id}")]
pub async fn delete_group(
    AuthenticatedUser(user): AuthenticatedUser,
    groups: web::Data<Groups>,
    path: web::Path<i64>,
) -> Result<HttpResponse, DomainError> {
    groups.delete_group(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
