//! Shared fixtures for the integration tests: an in-memory SQLite database
//! with migrations applied, plus seeding shortcuts.

#![allow(dead_code)]

use std::sync::Arc;

use kinoteka::{
    AppState,
    catalog::Catalog,
    config::Config,
    entities::{actor, category, genre, movie, movie_genre, review},
    review_limit::ReviewLimiter,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};

pub async fn test_catalog() -> Catalog {
    // A pool of one keeps every query on the same in-memory database.
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1);
    let db = Database::connect(opts).await.expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    Catalog::new(db)
}

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        admin_user: "admin".to_string(),
        admin_password: "secret".to_string(),
        session_secret: "test-secret".to_string(),
        review_rate_per_min: 1000,
    }
}

pub async fn test_state() -> Arc<AppState> {
    let catalog = test_catalog().await;
    let config = Arc::new(test_config());
    let review_limiter = Arc::new(ReviewLimiter::new(config.review_rate_per_min));
    Arc::new(AppState { config, catalog, review_limiter })
}

pub async fn seed_movie(
    catalog: &Catalog,
    title: &str,
    slug: &str,
    year: i32,
    draft: bool,
) -> movie::Model {
    movie::ActiveModel {
        id: Default::default(),
        title: Set(title.to_string()),
        tagline: Set(String::new()),
        description: Set(format!("<p>{title}</p>")),
        poster: Set(format!("/media/{slug}.jpg")),
        year: Set(year),
        country: Set("USA".to_string()),
        world_premiere: Set("2020-01-01".to_string()),
        budget: Set(0),
        fees_in_usa: Set(0),
        fees_in_world: Set(0),
        category_id: Set(None),
        url: Set(slug.to_string()),
        draft: Set(draft),
    }
    .insert(catalog.db())
    .await
    .expect("insert movie")
}

pub async fn seed_category(catalog: &Catalog, name: &str, slug: &str) -> category::Model {
    category::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        description: Set(String::new()),
        url: Set(slug.to_string()),
    }
    .insert(catalog.db())
    .await
    .expect("insert category")
}

pub async fn seed_genre(catalog: &Catalog, name: &str, slug: &str) -> genre::Model {
    genre::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        description: Set(String::new()),
        url: Set(slug.to_string()),
    }
    .insert(catalog.db())
    .await
    .expect("insert genre")
}

pub async fn seed_actor(catalog: &Catalog, name: &str) -> actor::Model {
    actor::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        age: Set(40),
        description: Set(String::new()),
        image: Set(format!("/media/actors/{name}.jpg")),
    }
    .insert(catalog.db())
    .await
    .expect("insert actor")
}

pub async fn tag_genre(catalog: &Catalog, movie_id: i32, genre_id: i32) {
    movie_genre::ActiveModel { movie_id: Set(movie_id), genre_id: Set(genre_id) }
        .insert(catalog.db())
        .await
        .expect("insert movie_genre");
}

pub async fn seed_review(
    catalog: &Catalog,
    movie_id: i32,
    name: &str,
    parent_id: Option<i32>,
) -> review::Model {
    review::ActiveModel {
        id: Default::default(),
        email: Set(format!("{name}@example.com")),
        name: Set(name.to_string()),
        text: Set("A review.".to_string()),
        parent_id: Set(parent_id),
        movie_id: Set(movie_id),
    }
    .insert(catalog.db())
    .await
    .expect("insert review")
}
