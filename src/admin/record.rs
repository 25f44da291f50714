//! Record forms for the back-office: building the renderable field list for
//! an entity and saving a submitted form back to the store. Save failures
//! that come from the store (unique slug collisions above all) are returned
//! as form errors, not surfaced as 500s.

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    AppState,
    admin::{FieldKind, FormField, InlineRow, schema::AdminConfig},
    entities::{actor, category, genre, movie, movie_shot, rating, rating_star, review},
    error::{AppError, AppResult},
};

/// Submitted form body, order-preserving so repeated keys (multi-selects,
/// checkboxes) survive.
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Last submitted value for the key, trimmed; empty if absent.
    pub fn text(&self, key: &str) -> String {
        self.values(key).last().unwrap_or("").trim().to_string()
    }

    pub fn opt_i32(&self, key: &str) -> Option<i32> {
        let text = self.text(key);
        if text.is_empty() { None } else { text.parse().ok() }
    }

    pub fn i32_or(&self, key: &str, default: i32) -> i32 {
        self.opt_i32(key).unwrap_or(default)
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        let text = self.text(key);
        if text.is_empty() { default } else { text.parse().unwrap_or(default) }
    }

    /// Checkbox semantics: present at all counts as checked.
    pub fn flag(&self, key: &str) -> bool {
        self.values(key).next().is_some()
    }

    pub fn ids(&self, key: &str) -> Vec<i32> {
        self.values(key).filter_map(|v| v.parse().ok()).collect()
    }

    /// Distinct record ids appearing as `{prefix}_{id}_…` keys, in first-seen
    /// order.
    pub fn inline_ids(&self, prefix: &str) -> Vec<i32> {
        let mut out = Vec::new();
        for (key, _) in &self.pairs {
            let Some(rest) = key.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
                continue;
            };
            let Some(id) = rest.split('_').next().and_then(|s| s.parse().ok()) else {
                continue;
            };
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

/// Everything the form template renders for one record.
pub struct AdminForm {
    pub fields: Vec<FormField>,
    pub shots: Vec<InlineRow>,
    pub reviews: Vec<InlineRow>,
    /// Offer one blank still row on the movie form.
    pub blank_shot: bool,
}

impl AdminForm {
    fn plain(fields: Vec<FormField>) -> Self {
        Self { fields, shots: Vec::new(), reviews: Vec::new(), blank_shot: false }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn text_field(name: &'static str, label: &str, value: String) -> FormField {
    FormField { name, label: label.to_string(), kind: FieldKind::Text(value), readonly: false }
}

pub async fn build_form(
    state: &AppState,
    config: &'static AdminConfig,
    id: Option<i32>,
) -> AppResult<AdminForm> {
    let db = state.catalog.db();
    match config.slug {
        "category" => {
            let existing = match id {
                Some(id) => {
                    Some(category::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
                },
                None => None,
            };
            let (name, description, url) = match existing {
                Some(c) => (c.name, c.description, c.url),
                None => Default::default(),
            };
            Ok(AdminForm::plain(vec![
                text_field("name", "Name", name),
                FormField {
                    name: "description",
                    label: "Description".to_string(),
                    kind: FieldKind::TextArea(description),
                    readonly: false,
                },
                text_field("url", "Slug", url),
            ]))
        },
        "genre" => {
            let existing = match id {
                Some(id) => {
                    Some(genre::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
                },
                None => None,
            };
            let (name, description, url) = match existing {
                Some(g) => (g.name, g.description, g.url),
                None => Default::default(),
            };
            Ok(AdminForm::plain(vec![
                text_field("name", "Name", name),
                FormField {
                    name: "description",
                    label: "Description".to_string(),
                    kind: FieldKind::TextArea(description),
                    readonly: false,
                },
                text_field("url", "Slug", url),
            ]))
        },
        "actor" => {
            let existing = match id {
                Some(id) => {
                    Some(actor::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
                },
                None => None,
            };
            let (name, age, description, image) = match existing {
                Some(a) => (a.name, a.age, a.description, a.image),
                None => (String::new(), 0, String::new(), String::new()),
            };
            Ok(AdminForm::plain(vec![
                text_field("name", "Name", name),
                FormField {
                    name: "age",
                    label: "Age".to_string(),
                    kind: FieldKind::Number(age.into()),
                    readonly: false,
                },
                FormField {
                    name: "description",
                    label: "Description".to_string(),
                    kind: FieldKind::TextArea(description),
                    readonly: false,
                },
                FormField {
                    name: "image",
                    label: "Image".to_string(),
                    kind: FieldKind::ImagePreview(image),
                    readonly: false,
                },
            ]))
        },
        "movie" => build_movie_form(state, id).await,
        "movie-shot" => {
            let existing = match id {
                Some(id) => Some(
                    movie_shot::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?,
                ),
                None => None,
            };
            let movies = movie_options(state).await?;
            let (title, description, image, movie_id) = match existing {
                Some(s) => (s.title, s.description, s.image, Some(s.movie_id)),
                None => (String::new(), String::new(), String::new(), None),
            };
            Ok(AdminForm::plain(vec![
                text_field("title", "Title", title),
                FormField {
                    name: "description",
                    label: "Description".to_string(),
                    kind: FieldKind::TextArea(description),
                    readonly: false,
                },
                FormField {
                    name: "image",
                    label: "Image".to_string(),
                    kind: FieldKind::ImagePreview(image),
                    readonly: false,
                },
                FormField {
                    name: "movie",
                    label: "Movie".to_string(),
                    kind: FieldKind::Select {
                        options: movies,
                        selected: movie_id,
                        allow_empty: false,
                    },
                    readonly: false,
                },
            ]))
        },
        "rating-star" => {
            let existing = match id {
                Some(id) => Some(
                    rating_star::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?,
                ),
                None => None,
            };
            let value = existing.map(|s| s.value).unwrap_or(0);
            Ok(AdminForm::plain(vec![FormField {
                name: "value",
                label: "Value".to_string(),
                kind: FieldKind::Number(value.into()),
                readonly: false,
            }]))
        },
        "rating" => {
            let existing = match id {
                Some(id) => {
                    Some(rating::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
                },
                None => None,
            };
            let movies = movie_options(state).await?;
            let stars = rating_star::Entity::find()
                .order_by_asc(rating_star::Column::Value)
                .all(db)
                .await?
                .into_iter()
                .map(|s| (s.id, s.value.to_string()))
                .collect();
            let (ip, star_id, movie_id) = match existing {
                Some(r) => (r.ip, Some(r.star_id), Some(r.movie_id)),
                None => (String::new(), None, None),
            };
            Ok(AdminForm::plain(vec![
                text_field("ip", "IP address", ip),
                FormField {
                    name: "star",
                    label: "Star".to_string(),
                    kind: FieldKind::Select { options: stars, selected: star_id, allow_empty: false },
                    readonly: false,
                },
                FormField {
                    name: "movie",
                    label: "Movie".to_string(),
                    kind: FieldKind::Select {
                        options: movies,
                        selected: movie_id,
                        allow_empty: false,
                    },
                    readonly: false,
                },
            ]))
        },
        "review" => {
            let existing = match id {
                Some(id) => {
                    Some(review::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?)
                },
                None => None,
            };
            let movies = movie_options(state).await?;
            let (name, email, text, parent_id, movie_id) = match existing {
                Some(r) => (r.name, r.email, r.text, r.parent_id, Some(r.movie_id)),
                None => (String::new(), String::new(), String::new(), None, None),
            };
            Ok(AdminForm::plain(vec![
                FormField {
                    name: "name",
                    label: "Name".to_string(),
                    kind: FieldKind::Text(name),
                    readonly: true,
                },
                FormField {
                    name: "email",
                    label: "Email".to_string(),
                    kind: FieldKind::Text(email),
                    readonly: true,
                },
                FormField {
                    name: "text",
                    label: "Text".to_string(),
                    kind: FieldKind::TextArea(text),
                    readonly: false,
                },
                FormField {
                    name: "parent",
                    label: "Parent review id".to_string(),
                    kind: FieldKind::Text(
                        parent_id.map(|p| p.to_string()).unwrap_or_default(),
                    ),
                    readonly: false,
                },
                FormField {
                    name: "movie",
                    label: "Movie".to_string(),
                    kind: FieldKind::Select {
                        options: movies,
                        selected: movie_id,
                        allow_empty: false,
                    },
                    readonly: false,
                },
            ]))
        },
        _ => Err(AppError::NotFound),
    }
}

async fn build_movie_form(state: &AppState, id: Option<i32>) -> AppResult<AdminForm> {
    let db = state.catalog.db();

    let existing = match id {
        Some(id) => Some(movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?),
        None => None,
    };

    let people: Vec<(i32, String)> = actor::Entity::find()
        .order_by_asc(actor::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let genres: Vec<(i32, String)> = genre::Entity::find()
        .order_by_asc(genre::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();
    let categories: Vec<(i32, String)> = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let (cast, directors) = match &existing {
        Some(m) => (
            state.catalog.movie_cast(m.id).await?.into_iter().map(|a| a.id).collect(),
            state.catalog.movie_directors(m.id).await?.into_iter().map(|a| a.id).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };
    let movie_genres: Vec<i32> = match &existing {
        Some(m) => state.catalog.movie_genres(m.id).await?.into_iter().map(|g| g.id).collect(),
        None => Vec::new(),
    };

    let (shots, reviews) = match &existing {
        Some(m) => (
            state.catalog.movie_shots(m.id).await?,
            state.catalog.top_level_reviews(m.id).await?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    let m = existing.unwrap_or(movie::Model {
        id: 0,
        title: String::new(),
        tagline: String::new(),
        description: String::new(),
        poster: String::new(),
        year: 2020,
        country: String::new(),
        world_premiere: String::new(),
        budget: 0,
        fees_in_usa: 0,
        fees_in_world: 0,
        category_id: None,
        url: String::new(),
        draft: false,
    });

    let fields = vec![
        text_field("title", "Title", m.title),
        text_field("tagline", "Tagline", m.tagline),
        FormField {
            name: "description",
            label: "Description".to_string(),
            kind: FieldKind::RichText(m.description),
            readonly: false,
        },
        text_field("poster", "Poster", m.poster.clone()),
        FormField {
            name: "poster_preview",
            label: "Preview".to_string(),
            kind: FieldKind::ImagePreview(m.poster),
            readonly: true,
        },
        FormField {
            name: "year",
            label: "Year".to_string(),
            kind: FieldKind::Number(m.year.into()),
            readonly: false,
        },
        FormField {
            name: "world_premiere",
            label: "World premiere".to_string(),
            kind: FieldKind::Date(m.world_premiere),
            readonly: false,
        },
        text_field("country", "Country", m.country),
        FormField {
            name: "actors",
            label: "Cast".to_string(),
            kind: FieldKind::MultiSelect { options: people.clone(), selected: cast },
            readonly: false,
        },
        FormField {
            name: "directors",
            label: "Directors".to_string(),
            kind: FieldKind::MultiSelect { options: people, selected: directors },
            readonly: false,
        },
        FormField {
            name: "genres",
            label: "Genres".to_string(),
            kind: FieldKind::MultiSelect { options: genres, selected: movie_genres },
            readonly: false,
        },
        FormField {
            name: "category",
            label: "Category".to_string(),
            kind: FieldKind::Select {
                options: categories,
                selected: m.category_id,
                allow_empty: true,
            },
            readonly: false,
        },
        FormField {
            name: "budget",
            label: "Budget ($)".to_string(),
            kind: FieldKind::Number(m.budget),
            readonly: false,
        },
        FormField {
            name: "fees_in_usa",
            label: "Fees in USA ($)".to_string(),
            kind: FieldKind::Number(m.fees_in_usa),
            readonly: false,
        },
        FormField {
            name: "fees_in_world",
            label: "Fees worldwide ($)".to_string(),
            kind: FieldKind::Number(m.fees_in_world),
            readonly: false,
        },
        text_field("url", "Slug", m.url),
        FormField {
            name: "draft",
            label: "Draft".to_string(),
            kind: FieldKind::Checkbox(m.draft),
            readonly: false,
        },
    ];

    let shot_rows = shots
        .into_iter()
        .map(|s| InlineRow {
            id: s.id,
            fields: vec![
                ("title", "Title", s.title, false),
                ("description", "Description", s.description, false),
                ("image", "Image", s.image.clone(), false),
            ],
            thumb: Some(s.image),
        })
        .collect();

    let review_rows = reviews
        .into_iter()
        .map(|r| InlineRow {
            id: r.id,
            fields: vec![
                ("name", "Name", r.name, true),
                ("email", "Email", r.email, true),
                ("text", "Text", r.text, false),
            ],
            thumb: None,
        })
        .collect();

    Ok(AdminForm { fields, shots: shot_rows, reviews: review_rows, blank_shot: id.is_some() })
}

async fn movie_options(state: &AppState) -> AppResult<Vec<(i32, String)>> {
    let options = movie::Entity::find()
        .order_by_asc(movie::Column::Title)
        .all(state.catalog.db())
        .await?
        .into_iter()
        .map(|m| (m.id, m.title))
        .collect();
    Ok(options)
}

/// Persist a submitted record form. `Ok(Err(msg))` is a form-level error the
/// caller re-renders; `Err(_)` is a request failure.
pub async fn save_record(
    state: &AppState,
    config: &'static AdminConfig,
    id: Option<i32>,
    data: &FormData,
) -> AppResult<Result<(), String>> {
    let db = state.catalog.db();
    let result: Result<(), sea_orm::DbErr> = match config.slug {
        "category" => {
            let mut am = category::ActiveModel {
                id: Default::default(),
                name: Set(data.text("name")),
                description: Set(data.text("description")),
                url: Set(data.text("url")),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "genre" => {
            let mut am = genre::ActiveModel {
                id: Default::default(),
                name: Set(data.text("name")),
                description: Set(data.text("description")),
                url: Set(data.text("url")),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "actor" => {
            let mut am = actor::ActiveModel {
                id: Default::default(),
                name: Set(data.text("name")),
                age: Set(data.i32_or("age", 0).max(0)),
                description: Set(data.text("description")),
                image: Set(data.text("image")),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "movie" => return save_movie(state, id, data).await,
        "movie-shot" => {
            let Some(movie_id) = data.opt_i32("movie") else {
                return Ok(Err("A movie is required".to_string()));
            };
            let mut am = movie_shot::ActiveModel {
                id: Default::default(),
                title: Set(data.text("title")),
                description: Set(data.text("description")),
                image: Set(data.text("image")),
                movie_id: Set(movie_id),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "rating-star" => {
            let mut am = rating_star::ActiveModel {
                id: Default::default(),
                value: Set(data.i32_or("value", 0).max(0)),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "rating" => {
            let (Some(star_id), Some(movie_id)) = (data.opt_i32("star"), data.opt_i32("movie"))
            else {
                return Ok(Err("A star and a movie are required".to_string()));
            };
            let mut am = rating::ActiveModel {
                id: Default::default(),
                ip: Set(data.text("ip").chars().take(15).collect()),
                star_id: Set(star_id),
                movie_id: Set(movie_id),
            };
            match id {
                Some(id) => {
                    am.id = Set(id);
                    am.update(db).await.map(drop)
                },
                None => am.insert(db).await.map(drop),
            }
        },
        "review" => {
            let Some(movie_id) = data.opt_i32("movie") else {
                return Ok(Err("A movie is required".to_string()));
            };
            match id {
                Some(id) => {
                    // Author identity stays as submitted by the visitor.
                    let existing = review::Entity::find_by_id(id)
                        .one(db)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    let mut am: review::ActiveModel = existing.into();
                    am.text = Set(data.text("text"));
                    am.parent_id = Set(data.opt_i32("parent"));
                    am.movie_id = Set(movie_id);
                    am.update(db).await.map(drop)
                },
                None => review::ActiveModel {
                    id: Default::default(),
                    email: Set(data.text("email")),
                    name: Set(data.text("name")),
                    text: Set(data.text("text")),
                    parent_id: Set(data.opt_i32("parent")),
                    movie_id: Set(movie_id),
                }
                .insert(db)
                .await
                .map(drop),
            }
        },
        _ => return Err(AppError::NotFound),
    };

    match result {
        Ok(()) => Ok(Ok(())),
        Err(err) => Ok(Err(err.to_string())),
    }
}

async fn save_movie(
    state: &AppState,
    id: Option<i32>,
    data: &FormData,
) -> AppResult<Result<(), String>> {
    let db = state.catalog.db();

    let world_premiere = data.text("world_premiere");
    let world_premiere = if world_premiere.is_empty() {
        // The premiere defaults to the day the record is created.
        let today: jiff::civil::Date = jiff::Zoned::now().into();
        today.to_string()
    } else {
        match world_premiere.parse::<jiff::civil::Date>() {
            Ok(date) => date.to_string(),
            Err(_) => return Ok(Err("World premiere must be an ISO date (YYYY-MM-DD)".to_string())),
        }
    };

    let mut am = movie::ActiveModel {
        id: Default::default(),
        title: Set(data.text("title")),
        tagline: Set(data.text("tagline")),
        description: Set(data.text("description")),
        poster: Set(data.text("poster")),
        year: Set(data.i32_or("year", 2020)),
        country: Set(data.text("country")),
        world_premiere: Set(world_premiere),
        budget: Set(data.i64_or("budget", 0).max(0)),
        fees_in_usa: Set(data.i64_or("fees_in_usa", 0).max(0)),
        fees_in_world: Set(data.i64_or("fees_in_world", 0).max(0)),
        category_id: Set(data.opt_i32("category")),
        url: Set(data.text("url")),
        draft: Set(data.flag("draft")),
    };

    let movie_id = match id {
        Some(id) => {
            am.id = Set(id);
            match am.update(db).await {
                Ok(m) => m.id,
                Err(err) => return Ok(Err(err.to_string())),
            }
        },
        None => match am.insert(db).await {
            Ok(m) => m.id,
            Err(err) => return Ok(Err(err.to_string())),
        },
    };

    state
        .catalog
        .set_movie_relations(
            movie_id,
            &data.ids("actors"),
            &data.ids("directors"),
            &data.ids("genres"),
        )
        .await?;

    save_movie_inlines(state, movie_id, data).await?;

    Ok(Ok(()))
}

/// Inline still and review rows embedded in the movie form.
async fn save_movie_inlines(state: &AppState, movie_id: i32, data: &FormData) -> AppResult<()> {
    let db = state.catalog.db();

    for shot_id in data.inline_ids("shot") {
        if data.flag(&format!("shot_{shot_id}_delete")) {
            state.catalog.delete_movie_shot(shot_id).await?;
            continue;
        }
        let existing = movie_shot::Entity::find_by_id(shot_id).one(db).await?;
        if let Some(shot) = existing {
            let mut am: movie_shot::ActiveModel = shot.into();
            am.title = Set(data.text(&format!("shot_{shot_id}_title")));
            am.description = Set(data.text(&format!("shot_{shot_id}_description")));
            am.image = Set(data.text(&format!("shot_{shot_id}_image")));
            am.update(db).await?;
        }
    }

    let new_title = data.text("shot_new_title");
    if !new_title.is_empty() {
        movie_shot::ActiveModel {
            id: Default::default(),
            title: Set(new_title),
            description: Set(data.text("shot_new_description")),
            image: Set(data.text("shot_new_image")),
            movie_id: Set(movie_id),
        }
        .insert(db)
        .await?;
    }

    for review_id in data.inline_ids("review") {
        if data.flag(&format!("review_{review_id}_delete")) {
            state.catalog.delete_review(review_id).await?;
            continue;
        }
        let existing = review::Entity::find_by_id(review_id).one(db).await?;
        if let Some(r) = existing {
            let mut am: review::ActiveModel = r.into();
            am.text = Set(data.text(&format!("review_{review_id}_text")));
            am.update(db).await?;
        }
    }

    Ok(())
}
