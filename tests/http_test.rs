//! End-to-end route behavior through the router.

mod helpers;

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use kinoteka::{AppState, build_app, entities::review};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> (Router, Arc<AppState>) {
    let state = helpers::test_state().await;
    let app = build_app(state.clone())
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    (app, state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn index_lists_only_published_movies() {
    let (app, state) = test_app().await;
    helpers::seed_movie(&state.catalog, "Visible Film", "visible", 2010, false).await;
    helpers::seed_movie(&state.catalog, "Hidden Film", "hidden", 2010, true).await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Visible Film"));
    assert!(!body.contains("Hidden Film"));
}

#[tokio::test]
async fn filter_endpoint_accepts_repeated_params() {
    let (app, state) = test_app().await;
    helpers::seed_movie(&state.catalog, "Ten", "ten", 2010, false).await;
    helpers::seed_movie(&state.catalog, "Eleven", "eleven", 2011, false).await;
    helpers::seed_movie(&state.catalog, "Twelve", "twelve", 2012, false).await;

    let (status, body) = get(&app, "/filter?year=2010&year=2011").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ten"));
    assert!(body.contains("Eleven"));
    assert!(!body.contains("Twelve"));
}

#[tokio::test]
async fn json_filter_returns_projected_movies() {
    let (app, state) = test_app().await;
    let genre = helpers::seed_genre(&state.catalog, "Drama", "drama").await;
    let movie = helpers::seed_movie(&state.catalog, "Projected", "projected", 2010, false).await;
    helpers::tag_genre(&state.catalog, movie.id, genre.id).await;

    let uri = format!("/json-filter?year=2010&genre={}", genre.id);
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let movies = json["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    let mut keys: Vec<&str> =
        movies[0].as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["poster", "tagline", "title", "url"]);
}

#[tokio::test]
async fn detail_page_renders_description_markup_verbatim() {
    let (app, state) = test_app().await;
    helpers::seed_movie(&state.catalog, "Marked Up", "marked-up", 2010, false).await;

    let (status, body) = get(&app, "/marked-up").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p>Marked Up</p>"));
}

#[tokio::test]
async fn unknown_slug_is_a_404() {
    let (app, _) = test_app().await;
    let (status, _) = get(&app, "/no-such-movie").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn actor_detail_resolves_by_name() {
    let (app, state) = test_app().await;
    helpers::seed_actor(&state.catalog, "Ada Lovelace").await;

    let (status, body) = get(&app, "/actor/Ada%20Lovelace").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Ada Lovelace"));

    let (status, _) = get(&app, "/actor/Nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn valid_review_persists_and_redirects_to_the_movie() {
    let (app, state) = test_app().await;
    let movie = helpers::seed_movie(&state.catalog, "M", "the-slug", 2010, false).await;

    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("/review/{}", movie.id),
            "name=Alice&email=alice%40example.com&text=Great+film&parent=",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/the-slug");

    let rows = review::Entity::find().all(state.catalog.db()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].movie_id, movie.id);
    assert_eq!(rows[0].parent_id, None);
}

#[tokio::test]
async fn review_with_parent_links_to_it() {
    let (app, state) = test_app().await;
    let movie = helpers::seed_movie(&state.catalog, "M", "m", 2010, false).await;
    let parent = helpers::seed_review(&state.catalog, movie.id, "first", None).await;

    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("/review/{}", movie.id),
            &format!("name=Bob&email=bob%40example.com&text=Agreed&parent={}", parent.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let rows = state.catalog.review_tree(movie.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].replies.len(), 1);
    assert_eq!(rows[0].replies[0].review.name, "Bob");
}

#[tokio::test]
async fn invalid_review_is_dropped_but_still_redirects() {
    let (app, state) = test_app().await;
    let movie = helpers::seed_movie(&state.catalog, "M", "the-slug", 2010, false).await;

    let resp = app
        .clone()
        .oneshot(form_request(
            &format!("/review/{}", movie.id),
            "name=Alice&email=not-an-email&text=Great",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/the-slug");
    assert!(review::Entity::find().all(state.catalog.db()).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_for_a_missing_movie_is_a_404() {
    let (app, state) = test_app().await;

    let resp = app
        .clone()
        .oneshot(form_request("/review/999", "name=A&email=a%40example.com&text=hi"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(review::Entity::find().all(state.catalog.db()).await.unwrap().is_empty());
}

#[tokio::test]
async fn rating_endpoint_reports_created_and_bad_request() {
    let (app, state) = test_app().await;
    let movie = helpers::seed_movie(&state.catalog, "M", "m", 2010, false).await;
    let stars = state.catalog.rating_stars().await.unwrap();

    let resp = app
        .clone()
        .oneshot(form_request("/rating", &format!("star={}&movie={}", stars[0].id, movie.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(form_request("/rating", &format!("star=999&movie={}", movie.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---- back-office ----

async fn operator_cookie(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(form_request("/admin/login", "username=admin&password=secret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    cookie.split(';').next().unwrap().to_string()
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn admin_pages_require_an_operator_session() {
    let (app, _) = test_app().await;

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/admin/movie").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/admin/login");
}

#[tokio::test]
async fn wrong_credentials_bounce_back_to_the_login_form() {
    let (app, _) = test_app().await;

    let resp = app
        .clone()
        .oneshot(form_request("/admin/login", "username=admin&password=wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/admin/login?error=1");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn admin_movie_list_shows_drafts_too() {
    let (app, state) = test_app().await;
    helpers::seed_movie(&state.catalog, "Public Film", "public", 2010, false).await;
    helpers::seed_movie(&state.catalog, "Draft Film", "draft", 2010, true).await;

    let cookie = operator_cookie(&app).await;
    let (status, body) = get_with_cookie(&app, "/admin/movie", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Public Film"));
    assert!(body.contains("Draft Film"));
}

#[tokio::test]
async fn bulk_publish_reports_the_affected_row_count() {
    let (app, state) = test_app().await;
    let a = helpers::seed_movie(&state.catalog, "A", "a", 2010, true).await;
    let b = helpers::seed_movie(&state.catalog, "B", "b", 2011, true).await;
    helpers::seed_movie(&state.catalog, "C", "c", 2012, true).await;

    let cookie = operator_cookie(&app).await;
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/movie/action")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from(format!("action=publish&selected={}&selected={}", a.id, b.id)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.contains("msg=2%20records%20updated"), "location was {location}");

    assert!(!state.catalog.movie_by_id(a.id).await.unwrap().draft);
    assert!(!state.catalog.movie_by_id(b.id).await.unwrap().draft);

    // Singular phrasing for a single row.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/movie/action")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from(format!("action=unpublish&selected={}", a.id)))
                .unwrap(),
        )
        .await
        .unwrap();
    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.contains("msg=1%20record%20updated"), "location was {location}");
    assert!(state.catalog.movie_by_id(a.id).await.unwrap().draft);
}
