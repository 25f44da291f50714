use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Query;
use tracing::debug;
use validator::Validate;

use crate::{
    AppState,
    error::{AppError, AppResult},
    forms::{FilterParams, RatingForm, ReviewForm},
    models::MovieFilter,
    templates,
};

pub async fn movie_list(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let (movies, facets) =
        futures::try_join!(state.catalog.published_movies(), state.catalog.facets())?;
    Ok(Html(templates::movie_list_page("Movies", &movies, &facets, None)))
}

pub async fn movie_filter(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> AppResult<Html<String>> {
    let filter: MovieFilter = params.into();
    let (movies, facets) =
        futures::try_join!(state.catalog.filter_movies(&filter), state.catalog.facets())?;
    Ok(Html(templates::movie_list_page("Filtered movies", &movies, &facets, Some(&filter))))
}

pub async fn movie_filter_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> AppResult<Json<serde_json::Value>> {
    let filter: MovieFilter = params.into();
    let cards = state.catalog.filter_movie_cards(&filter).await?;
    Ok(Json(serde_json::json!({ "movies": cards })))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let (page, facets) =
        futures::try_join!(state.catalog.movie_page(&slug), state.catalog.facets())?;
    let stars = state.catalog.rating_stars().await?;
    Ok(Html(templates::movie_detail_page(&page, &facets, &stars)))
}

pub async fn actor_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Html<String>> {
    let (actor, facets) =
        futures::try_join!(state.catalog.actor_by_name(&name), state.catalog.facets())?;
    Ok(Html(templates::actor_page(&actor, &facets)))
}

/// Persist a review and bounce back to the movie page. Invalid or throttled
/// submissions are dropped without feedback; the redirect happens either way.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<ReviewForm>,
) -> AppResult<Redirect> {
    let movie = state.catalog.movie_by_id(movie_id).await?;

    let ip = client_ip(&headers, addr);
    if !state.review_limiter.allow(&ip) {
        debug!(ip = %ip, movie_id, "review submission throttled");
        return Ok(Redirect::to(&format!("/{}", movie.url)));
    }

    match form.validate() {
        Ok(()) => {
            let review = state.catalog.insert_review(movie.id, &form).await?;
            debug!(review_id = review.id, movie_id, parent = ?review.parent_id, "review saved");
        },
        Err(err) => {
            debug!(movie_id, error = %err, "dropping invalid review submission");
        },
    }

    Ok(Redirect::to(&format!("/{}", movie.url)))
}

/// Star vote: one per (ip, movie), later votes replace the star.
pub async fn add_rating(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<RatingForm>,
) -> Response {
    let ip = client_ip(&headers, addr);
    match state.catalog.rate_movie(&ip, form.movie, form.star).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(AppError::NotFound) => StatusCode::BAD_REQUEST.into_response(),
        Err(err) => err.into_response(),
    }
}

/// First X-Forwarded-For hop, else the peer address, truncated to the
/// 15-char column.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
        .chars()
        .take(15)
        .collect()
}
