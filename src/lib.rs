pub mod admin;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod forms;
pub mod models;
pub mod review_limit;
pub mod routes;
pub mod templates;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{catalog::Catalog, config::Config, review_limit::ReviewLimiter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub review_limiter: Arc<ReviewLimiter>,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::movie_list))
        .route("/filter", get(routes::movie_filter))
        .route("/json-filter", get(routes::movie_filter_json))
        .route("/review/{movie_id}", post(routes::add_review))
        .route("/rating", post(routes::add_rating))
        .route("/actor/{name}", get(routes::actor_detail))
        .route("/{slug}", get(routes::movie_detail))
        .nest("/admin", admin::router(state.clone()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
        )
}
