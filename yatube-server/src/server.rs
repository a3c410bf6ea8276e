use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::mail::WelcomeMailer;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers::{
    self, Auth, Comments, Feeds, Follows, Groups, Posts, backend,
};
use crate::presentation::middleware::JwtAuthMiddleware;

/// Application services shared by every worker.
#[derive(Clone)]
pub struct Services {
    pub auth: web::Data<Auth>,
    pub posts: web::Data<Posts>,
    pub comments: web::Data<Comments>,
    pub groups: web::Data<Groups>,
    pub follows: web::Data<Follows>,
    pub feeds: web::Data<Feeds>,
}

impl Services {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<backend::Users>,
        posts: Arc<backend::Posts>,
        groups: Arc<backend::Groups>,
        comments: Arc<backend::Comments>,
        follows: Arc<backend::Follows>,
        keys: JwtKeys,
        mailer: Arc<dyn WelcomeMailer>,
        page_size: u32,
        admins: Vec<String>,
    ) -> Self {
        Self {
            auth: web::Data::new(
                AuthService::new(users.clone(), keys, mailer).with_admins(admins),
            ),
            posts: web::Data::new(PostService::new(posts.clone(), groups.clone(), page_size)),
            comments: web::Data::new(CommentService::new(comments.clone(), posts.clone())),
            groups: web::Data::new(GroupService::new(groups.clone())),
            follows: web::Data::new(FollowService::new(follows.clone(), users.clone())),
            feeds: web::Data::new(FeedService::new(
                posts, groups, users, follows, comments, page_size,
            )),
        }
    }

    #[cfg(not(test))]
    pub fn postgres(
        pool: sqlx::PgPool,
        config: &AppConfig,
        mailer: Arc<dyn WelcomeMailer>,
    ) -> Self {
        Self::new(
            Arc::new(backend::Users::new(pool.clone())),
            Arc::new(backend::Posts::new(pool.clone())),
            Arc::new(backend::Groups::new(pool.clone())),
            Arc::new(backend::Comments::new(pool.clone())),
            Arc::new(backend::Follows::new(pool)),
            JwtKeys::new(
                config.jwt_secret.clone(),
                config.access_token_ttl_secs,
                config.refresh_token_ttl_secs,
            ),
            mailer,
            config.page_size,
            config.admin_usernames.clone(),
        )
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.posts.clone())
            .app_data(self.comments.clone())
            .app_data(self.groups.clone())
            .app_data(self.follows.clone())
            .app_data(self.feeds.clone())
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware::optional())
                    .route("/health", web::get().to(health))
                    .service(handlers::auth::signup)
                    .service(handlers::auth::token)
                    .service(handlers::auth::refresh)
                    .service(handlers::post::list_posts)
                    .service(handlers::post::create_post)
                    .service(handlers::post::get_post)
                    .service(handlers::post::replace_post)
                    .service(handlers::post::update_post)
                    .service(handlers::post::delete_post)
                    .service(handlers::comment::list_comments)
                    .service(handlers::comment::add_comment)
                    .service(handlers::group::list_groups)
                    .service(handlers::group::create_group)
                    .service(handlers::group::get_group)
                    .service(handlers::group::get_group_by_slug)
                    .service(handlers::group::replace_group)
                    .service(handlers::group::update_group)
                    .service(handlers::group::delete_group)
                    .service(
                        web::scope("/follow")
                            .wrap(JwtAuthMiddleware::required())
                            .service(handlers::follow::list_follows)
                            .service(handlers::follow::follow)
                            .service(handlers::follow::unfollow),
                    )
                    // registered before `/feed/{username}` so these paths win
                    .service(handlers::feed::home)
                    .service(handlers::feed::group)
                    .service(
                        web::scope("/feed/follow")
                            .wrap(JwtAuthMiddleware::required())
                            .service(handlers::feed::following),
                    )
                    .service(handlers::feed::profile)
                    .service(handlers::feed::post_detail),
            );
    }
}

pub fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .max_age(3600);

    if config.cors_origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors.supports_credentials()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
