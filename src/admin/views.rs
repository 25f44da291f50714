//! Handlers for the back-office: session management, entity lists with
//! search/filter, bulk actions, deletes. Record forms live in `record`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    admin::{
        AdminCell, AdminRow, FilterGroup, SESSION_COOKIE,
        record,
        schema::{self, AdminAction, AdminConfig},
        templates,
    },
    entities::{actor, category, genre, movie, movie_shot, rating, rating_star, review},
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_form(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    Html(templates::login_page(params.contains_key("error")))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let config = &state.config;
    if form.username == config.admin_user && form.password == config.admin_password {
        info!(user = %form.username, "operator signed in");
        let cookie = Cookie::build((SESSION_COOKIE, config.session_token()))
            .path("/admin")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::hours(12))
            .build();
        (jar.add(cookie), Redirect::to("/admin")).into_response()
    } else {
        info!(user = %form.username, "operator sign-in rejected");
        Redirect::to("/admin/login?error=1").into_response()
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/admin").build());
    (jar, Redirect::to("/admin/login")).into_response()
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let db = state.catalog.db();
    let mut entries = Vec::with_capacity(schema::REGISTRY.len());
    for config in schema::REGISTRY {
        let count = match config.slug {
            "category" => category::Entity::find().count(db).await?,
            "genre" => genre::Entity::find().count(db).await?,
            "actor" => actor::Entity::find().count(db).await?,
            "movie" => movie::Entity::find().count(db).await?,
            "movie-shot" => movie_shot::Entity::find().count(db).await?,
            "rating-star" => rating_star::Entity::find().count(db).await?,
            "rating" => rating::Entity::find().count(db).await?,
            "review" => review::Entity::find().count(db).await?,
            _ => 0,
        };
        entries.push((*config, count));
    }
    Ok(Html(templates::dashboard_page(&entries)))
}

pub async fn entity_list(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Html<String>> {
    let config = schema::config_for(&entity).ok_or(AppError::NotFound)?;
    let q = params.get("q").map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let message = params.get("msg").cloned();

    let (rows, filters) = build_rows(&state, config, q.as_deref(), &params).await?;

    Ok(Html(templates::list_page(config, &rows, &filters, q.as_deref(), message.as_deref())))
}

#[derive(Debug, Deserialize)]
pub struct DeletePath {
    pub entity: String,
    pub id: i32,
}

pub async fn entity_delete(
    State(state): State<Arc<AppState>>,
    Path(path): Path<DeletePath>,
) -> AppResult<Redirect> {
    let config = schema::config_for(&path.entity).ok_or(AppError::NotFound)?;
    let catalog = &state.catalog;
    match config.slug {
        "category" => catalog.delete_category(path.id).await?,
        "genre" => catalog.delete_genre(path.id).await?,
        "actor" => catalog.delete_actor(path.id).await?,
        "movie" => catalog.delete_movie(path.id).await?,
        "movie-shot" => catalog.delete_movie_shot(path.id).await?,
        "rating-star" => catalog.delete_rating_star(path.id).await?,
        "rating" => catalog.delete_rating(path.id).await?,
        "review" => catalog.delete_review(path.id).await?,
        _ => return Err(AppError::NotFound),
    }
    info!(entity = config.slug, id = path.id, "record deleted");
    Ok(list_redirect(config, "Record deleted"))
}

/// Bulk publish/unpublish over the checked movie rows.
pub async fn movie_bulk_action(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Redirect> {
    let action = pairs
        .iter()
        .find(|(k, _)| k == "action")
        .and_then(|(_, v)| AdminAction::from_key(v))
        .ok_or(AppError::NotFound)?;
    let ids: Vec<i32> = pairs
        .iter()
        .filter(|(k, _)| k == "selected")
        .filter_map(|(_, v)| v.parse().ok())
        .collect();

    let draft = matches!(action, AdminAction::Unpublish);
    let rows = state.catalog.set_draft_many(&ids, draft).await?;
    info!(action = action.key(), rows, "bulk draft update");

    Ok(list_redirect(&schema::MOVIE, &schema::updated_phrase(rows)))
}

/// Save the inline-editable draft checkboxes from the movie list. Unchecked
/// boxes are not submitted, so the form also carries the visible row ids.
pub async fn movie_save_drafts(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Redirect> {
    let visible: Vec<i32> = pairs
        .iter()
        .filter(|(k, _)| k == "visible")
        .filter_map(|(_, v)| v.parse().ok())
        .collect();
    let checked: Vec<i32> = pairs
        .iter()
        .filter_map(|(k, _)| k.strip_prefix("draft_"))
        .filter_map(|id| id.parse().ok())
        .collect();

    let (drafted, published): (Vec<i32>, Vec<i32>) =
        visible.into_iter().partition(|id| checked.contains(id));

    let mut rows = state.catalog.set_draft_many(&drafted, true).await?;
    rows += state.catalog.set_draft_many(&published, false).await?;

    Ok(list_redirect(&schema::MOVIE, &schema::updated_phrase(rows)))
}

pub async fn entity_new(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> AppResult<Html<String>> {
    let config = schema::config_for(&entity).ok_or(AppError::NotFound)?;
    let form = record::build_form(&state, config, None).await?;
    Ok(Html(templates::form_page(config, None, &form, None)))
}

pub async fn entity_create(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let config = schema::config_for(&entity).ok_or(AppError::NotFound)?;
    let data = record::FormData::from_pairs(pairs);
    match record::save_record(&state, config, None, &data).await? {
        Ok(()) => Ok(list_redirect(config, "Record created").into_response()),
        Err(error) => {
            let form = record::build_form(&state, config, None).await?;
            Ok(Html(templates::form_page(config, None, &form, Some(&error))).into_response())
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordPath {
    pub entity: String,
    pub id: i32,
}

pub async fn entity_edit(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RecordPath>,
) -> AppResult<Html<String>> {
    let config = schema::config_for(&path.entity).ok_or(AppError::NotFound)?;
    let form = record::build_form(&state, config, Some(path.id)).await?;
    Ok(Html(templates::form_page(config, Some(path.id), &form, None)))
}

pub async fn entity_update(
    State(state): State<Arc<AppState>>,
    Path(path): Path<RecordPath>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let config = schema::config_for(&path.entity).ok_or(AppError::NotFound)?;
    let data = record::FormData::from_pairs(pairs);
    match record::save_record(&state, config, Some(path.id), &data).await? {
        Ok(()) => Ok(list_redirect(config, "Record saved").into_response()),
        Err(error) => {
            let form = record::build_form(&state, config, Some(path.id)).await?;
            Ok(Html(templates::form_page(config, Some(path.id), &form, Some(&error)))
                .into_response())
        },
    }
}

fn list_redirect(config: &AdminConfig, message: &str) -> Redirect {
    Redirect::to(&format!("/admin/{}?msg={}", config.slug, urlencoding::encode(message)))
}

// ---- list rows per entity ----

async fn build_rows(
    state: &AppState,
    config: &'static AdminConfig,
    q: Option<&str>,
    params: &HashMap<String, String>,
) -> AppResult<(Vec<AdminRow>, Vec<FilterGroup>)> {
    let db = state.catalog.db();
    match config.slug {
        "category" => {
            let mut query = category::Entity::find().order_by_asc(category::Column::Id);
            if let Some(q) = q {
                query = query.filter(category::Column::Name.contains(q));
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|c| AdminRow {
                    id: c.id,
                    cells: vec![
                        link_cell(config, "id", c.id.to_string(), c.id),
                        link_cell(config, "name", c.name, c.id),
                        AdminCell::Text(c.url),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "genre" => {
            let mut query = genre::Entity::find().order_by_asc(genre::Column::Id);
            if let Some(q) = q {
                query = query.filter(genre::Column::Name.contains(q));
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|g| AdminRow {
                    id: g.id,
                    cells: vec![
                        link_cell(config, "id", g.id.to_string(), g.id),
                        link_cell(config, "name", g.name, g.id),
                        AdminCell::Text(g.description),
                        AdminCell::Text(g.url),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "actor" => {
            let mut query = actor::Entity::find().order_by_asc(actor::Column::Id);
            if let Some(q) = q {
                query = query.filter(actor::Column::Name.contains(q));
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|a| AdminRow {
                    id: a.id,
                    cells: vec![
                        link_cell(config, "id", a.id.to_string(), a.id),
                        link_cell(config, "name", a.name, a.id),
                        AdminCell::Text(a.age.to_string()),
                        AdminCell::Thumb(a.image),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "movie" => build_movie_rows(state, config, q, params).await,
        "movie-shot" => {
            let titles = movie_titles(state).await?;
            let mut query = movie_shot::Entity::find().order_by_asc(movie_shot::Column::Id);
            if let Some(q) = q {
                query = query.filter(movie_shot::Column::Title.contains(q));
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|s| AdminRow {
                    id: s.id,
                    cells: vec![
                        link_cell(config, "id", s.id.to_string(), s.id),
                        link_cell(config, "title", s.title, s.id),
                        AdminCell::Text(s.description),
                        AdminCell::Text(titles.get(&s.movie_id).cloned().unwrap_or_default()),
                        AdminCell::Thumb(s.image),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "rating-star" => {
            let rows = rating_star::Entity::find()
                .order_by_asc(rating_star::Column::Value)
                .all(db)
                .await?
                .into_iter()
                .map(|s| AdminRow {
                    id: s.id,
                    cells: vec![
                        link_cell(config, "id", s.id.to_string(), s.id),
                        link_cell(config, "value", s.value.to_string(), s.id),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "rating" => {
            let titles = movie_titles(state).await?;
            let stars: HashMap<i32, i32> = rating_star::Entity::find()
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.id, s.value))
                .collect();
            let mut query = rating::Entity::find().order_by_asc(rating::Column::Id);
            if let Some(q) = q {
                query = query.filter(rating::Column::Ip.contains(q));
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|r| AdminRow {
                    id: r.id,
                    cells: vec![
                        link_cell(config, "id", r.id.to_string(), r.id),
                        link_cell(config, "ip", r.ip, r.id),
                        AdminCell::Text(
                            stars.get(&r.star_id).map(|v| v.to_string()).unwrap_or_default(),
                        ),
                        AdminCell::Text(titles.get(&r.movie_id).cloned().unwrap_or_default()),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        "review" => {
            let titles = movie_titles(state).await?;
            let mut query = review::Entity::find().order_by_asc(review::Column::Id);
            if let Some(q) = q {
                query = query.filter(
                    Condition::any()
                        .add(review::Column::Name.contains(q))
                        .add(review::Column::Email.contains(q)),
                );
            }
            let rows = query
                .all(db)
                .await?
                .into_iter()
                .map(|r| AdminRow {
                    id: r.id,
                    cells: vec![
                        link_cell(config, "id", r.id.to_string(), r.id),
                        link_cell(config, "name", r.name, r.id),
                        match r.parent_id {
                            Some(p) => AdminCell::Text(format!("#{p}")),
                            None => AdminCell::Empty,
                        },
                        AdminCell::Text(titles.get(&r.movie_id).cloned().unwrap_or_default()),
                    ],
                })
                .collect();
            Ok((rows, Vec::new()))
        },
        _ => Err(AppError::NotFound),
    }
}

async fn build_movie_rows(
    state: &AppState,
    config: &'static AdminConfig,
    q: Option<&str>,
    params: &HashMap<String, String>,
) -> AppResult<(Vec<AdminRow>, Vec<FilterGroup>)> {
    let db = state.catalog.db();

    let categories: Vec<category::Model> =
        category::Entity::find().order_by_asc(category::Column::Name).all(db).await?;
    let category_names: HashMap<i32, String> =
        categories.iter().map(|c| (c.id, c.name.clone())).collect();

    let mut query = movie::Entity::find().order_by_asc(movie::Column::Id);

    let category_param = params.get("category").and_then(|v| v.parse::<i32>().ok());
    if let Some(id) = category_param {
        query = query.filter(movie::Column::CategoryId.eq(id));
    }
    let year_param = params.get("year").and_then(|v| v.parse::<i32>().ok());
    if let Some(year) = year_param {
        query = query.filter(movie::Column::Year.eq(year));
    }

    if let Some(q) = q {
        let matching_categories: Vec<i32> = categories
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&q.to_lowercase()))
            .map(|c| c.id)
            .collect();
        query = query.filter(
            Condition::any()
                .add(movie::Column::Title.contains(q))
                .add(movie::Column::CategoryId.is_in(matching_categories)),
        );
    }

    let movies = query.all(db).await?;

    // Filter facets cover all movies, not just the current page of results.
    let years: Vec<i32> = movie::Entity::find()
        .select_only()
        .column(movie::Column::Year)
        .distinct()
        .order_by_asc(movie::Column::Year)
        .into_tuple()
        .all(db)
        .await?;

    let filters = vec![
        FilterGroup {
            param: "category",
            label: "Category",
            options: categories.iter().map(|c| (c.id.to_string(), c.name.clone())).collect(),
            active: params.get("category").cloned(),
        },
        FilterGroup {
            param: "year",
            label: "Year",
            options: years.iter().map(|y| (y.to_string(), y.to_string())).collect(),
            active: params.get("year").cloned(),
        },
    ];

    let rows = movies
        .into_iter()
        .map(|m| AdminRow {
            id: m.id,
            cells: vec![
                link_cell(config, "id", m.id.to_string(), m.id),
                link_cell(config, "title", m.title, m.id),
                match m.category_id.and_then(|id| category_names.get(&id)) {
                    Some(name) => AdminCell::Text(name.clone()),
                    None => AdminCell::Empty,
                },
                AdminCell::Text(m.url),
                AdminCell::Bool(m.draft),
                AdminCell::Thumb(m.poster),
            ],
        })
        .collect();

    Ok((rows, filters))
}

async fn movie_titles(state: &AppState) -> AppResult<HashMap<i32, String>> {
    let titles = movie::Entity::find()
        .all(state.catalog.db())
        .await?
        .into_iter()
        .map(|m| (m.id, m.title))
        .collect();
    Ok(titles)
}

fn link_cell(config: &AdminConfig, column: &str, text: String, id: i32) -> AdminCell {
    if config.list_display_links.contains(&column) {
        AdminCell::Link { text, href: format!("/admin/{}/{}", config.slug, id) }
    } else {
        AdminCell::Text(text)
    }
}
