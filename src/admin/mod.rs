//! Back-office: a table-driven CRUD surface over every catalog entity,
//! gated behind an operator session.

pub mod record;
pub mod schema;
pub mod templates;
pub mod views;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;

pub const SESSION_COOKIE: &str = "kinoteka_admin";

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let guarded = Router::new()
        .route("/", get(views::dashboard))
        .route("/movie/action", post(views::movie_bulk_action))
        .route("/movie/drafts", post(views::movie_save_drafts))
        .route("/{entity}", get(views::entity_list))
        .route("/{entity}/new", get(views::entity_new).post(views::entity_create))
        .route("/{entity}/{id}", get(views::entity_edit).post(views::entity_update))
        .route("/{entity}/{id}/delete", post(views::entity_delete))
        .layer(middleware::from_fn_with_state(state, require_operator));

    Router::new()
        .route("/login", get(views::login_form).post(views::login))
        .route("/logout", post(views::logout))
        .merge(guarded)
}

/// Every guarded admin route requires the session cookie set by the login
/// handler; anything else bounces to the login form.
async fn require_operator(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let authorized = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value() == state.config.session_token())
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        Redirect::to("/admin/login").into_response()
    }
}

/// One rendered list-table row.
pub struct AdminRow {
    pub id: i32,
    pub cells: Vec<AdminCell>,
}

/// A cell of the generic list table.
pub enum AdminCell {
    Text(String),
    Link { text: String, href: String },
    Bool(bool),
    /// Fixed-size image preview, display only.
    Thumb(String),
    Empty,
}

/// A filter group in the list sidebar (one per `list_filter` column).
pub struct FilterGroup {
    pub param: &'static str,
    pub label: &'static str,
    /// (value, label) pairs.
    pub options: Vec<(String, String)>,
    pub active: Option<String>,
}

/// A renderable form field; built per entity at request time.
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    pub kind: FieldKind,
    pub readonly: bool,
}

pub enum FieldKind {
    Text(String),
    /// Opaque markup authored in the back-office, edited as raw HTML.
    RichText(String),
    TextArea(String),
    Number(i64),
    Date(String),
    Checkbox(bool),
    Select { options: Vec<(i32, String)>, selected: Option<i32>, allow_empty: bool },
    MultiSelect { options: Vec<(i32, String)>, selected: Vec<i32> },
    /// Image path with a fixed 50×60 preview next to it.
    ImagePreview(String),
}

/// Inline child rows embedded in the movie form.
pub struct InlineRow {
    pub id: i32,
    /// (field suffix, label, value, readonly)
    pub fields: Vec<(&'static str, &'static str, String, bool)>,
    pub thumb: Option<String>,
}
