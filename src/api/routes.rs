use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::AnyPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::docs::docs_routes;
use super::health::health_check;
use super::users::user_routes;
use crate::services::UserService;

pub fn create_routes(db: AnyPool) -> Router {
    let user_service = UserService::new(db);

    let api_v1 = Router::new().nest("/users", user_routes(user_service));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1)
        .merge(docs_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
}

/// CORS configuration: any origin, the CRUD verbs and the usual headers
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}
