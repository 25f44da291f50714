//! Query-layer behavior over a real (in-memory) database.

mod helpers;

use kinoteka::{forms::ReviewForm, models::MovieFilter};
use sea_orm::EntityTrait;

use kinoteka::entities::{rating, review};

#[tokio::test]
async fn published_movies_exclude_drafts() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "Visible", "visible", 2010, false).await;
    helpers::seed_movie(&catalog, "Hidden", "hidden", 2010, true).await;

    let movies = catalog.published_movies().await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Visible");
}

#[tokio::test]
async fn draft_movie_is_still_reachable_by_slug() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "Hidden", "hidden", 2010, true).await;

    let movie = catalog.movie_by_slug("hidden").await.unwrap();
    assert!(movie.draft);
}

#[tokio::test]
async fn facet_years_are_distinct_and_published_only() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "A", "a", 2010, false).await;
    helpers::seed_movie(&catalog, "B", "b", 2010, false).await;
    helpers::seed_movie(&catalog, "C", "c", 2015, false).await;
    helpers::seed_movie(&catalog, "D", "d", 1999, true).await;

    let facets = catalog.facets().await.unwrap();
    assert_eq!(facets.years, vec![2010, 2015]);
}

#[tokio::test]
async fn filter_by_year_alone_ignores_genres() {
    let catalog = helpers::test_catalog().await;
    let drama = helpers::seed_genre(&catalog, "Drama", "drama").await;
    let m2010 = helpers::seed_movie(&catalog, "Old", "old", 2010, false).await;
    helpers::seed_movie(&catalog, "New", "new", 2020, false).await;
    helpers::tag_genre(&catalog, m2010.id, drama.id).await;

    let filter = MovieFilter { years: vec![2010], genres: vec![] };
    let movies = catalog.filter_movies(&filter).await.unwrap();
    assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![m2010.id]);
}

#[tokio::test]
async fn filter_by_genre_alone_ignores_years() {
    let catalog = helpers::test_catalog().await;
    let drama = helpers::seed_genre(&catalog, "Drama", "drama").await;
    let comedy = helpers::seed_genre(&catalog, "Comedy", "comedy").await;
    let tagged = helpers::seed_movie(&catalog, "Tagged", "tagged", 2001, false).await;
    let other = helpers::seed_movie(&catalog, "Other", "other", 2002, false).await;
    helpers::tag_genre(&catalog, tagged.id, drama.id).await;
    helpers::tag_genre(&catalog, other.id, comedy.id).await;

    let filter = MovieFilter { years: vec![], genres: vec![drama.id] };
    let movies = catalog.filter_movies(&filter).await.unwrap();
    assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![tagged.id]);
}

#[tokio::test]
async fn filter_is_a_union_and_never_duplicates() {
    let catalog = helpers::test_catalog().await;
    let drama = helpers::seed_genre(&catalog, "Drama", "drama").await;
    let thriller = helpers::seed_genre(&catalog, "Thriller", "thriller").await;

    // Matches both clauses, and two selected genres at once.
    let both = helpers::seed_movie(&catalog, "Both", "both", 2010, false).await;
    helpers::tag_genre(&catalog, both.id, drama.id).await;
    helpers::tag_genre(&catalog, both.id, thriller.id).await;

    let year_only = helpers::seed_movie(&catalog, "YearOnly", "year-only", 2010, false).await;
    let genre_only = helpers::seed_movie(&catalog, "GenreOnly", "genre-only", 2015, false).await;
    helpers::tag_genre(&catalog, genre_only.id, drama.id).await;
    helpers::seed_movie(&catalog, "Neither", "neither", 2018, false).await;

    let filter = MovieFilter { years: vec![2010], genres: vec![drama.id, thriller.id] };
    let movies = catalog.filter_movies(&filter).await.unwrap();
    let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![both.id, year_only.id, genre_only.id]);
}

#[tokio::test]
async fn filter_excludes_drafts() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "Hidden", "hidden", 2010, true).await;
    let shown = helpers::seed_movie(&catalog, "Shown", "shown", 2010, false).await;

    let filter = MovieFilter { years: vec![2010], genres: vec![] };
    let movies = catalog.filter_movies(&filter).await.unwrap();
    assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![shown.id]);
}

#[tokio::test]
async fn empty_filter_matches_nothing() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "A", "a", 2010, false).await;

    let movies = catalog.filter_movies(&MovieFilter::default()).await.unwrap();
    assert!(movies.is_empty());
}

#[tokio::test]
async fn movie_cards_carry_only_the_projected_fields() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "Card", "card", 2010, false).await;

    let filter = MovieFilter { years: vec![2010], genres: vec![] };
    let cards = catalog.filter_movie_cards(&filter).await.unwrap();
    assert_eq!(cards.len(), 1);

    let json = serde_json::to_value(&cards[0]).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["poster", "tagline", "title", "url"]);
    assert_eq!(json["url"], movie.url);
}

#[tokio::test]
async fn top_level_reviews_exclude_replies_in_insertion_order() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let first = helpers::seed_review(&catalog, movie.id, "first", None).await;
    helpers::seed_review(&catalog, movie.id, "reply", Some(first.id)).await;
    let second = helpers::seed_review(&catalog, movie.id, "second", None).await;

    let top = catalog.top_level_reviews(movie.id).await.unwrap();
    assert_eq!(top.iter().map(|r| r.id).collect::<Vec<_>>(), vec![first.id, second.id]);
}

#[tokio::test]
async fn review_tree_nests_replies_under_their_parent() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let parent = helpers::seed_review(&catalog, movie.id, "parent", None).await;
    let reply = helpers::seed_review(&catalog, movie.id, "reply", Some(parent.id)).await;

    let tree = catalog.review_tree(movie.id).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].review.id, parent.id);
    assert_eq!(tree[0].replies.len(), 1);
    assert_eq!(tree[0].replies[0].review.id, reply.id);
}

#[tokio::test]
async fn insert_review_sets_movie_and_optional_parent() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;

    let form = ReviewForm {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        text: "Great.".to_string(),
        parent: None,
    };
    let top = catalog.insert_review(movie.id, &form).await.unwrap();
    assert_eq!(top.movie_id, movie.id);
    assert_eq!(top.parent_id, None);

    let form = ReviewForm { parent: Some(top.id), ..form };
    let reply = catalog.insert_review(movie.id, &form).await.unwrap();
    assert_eq!(reply.parent_id, Some(top.id));

    let all = review::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn rating_upserts_per_ip_and_movie() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let stars = catalog.rating_stars().await.unwrap();
    assert_eq!(stars.len(), 5);

    catalog.rate_movie("10.0.0.1", movie.id, stars[2].id).await.unwrap();
    catalog.rate_movie("10.0.0.1", movie.id, stars[4].id).await.unwrap();
    catalog.rate_movie("10.0.0.2", movie.id, stars[0].id).await.unwrap();

    let votes = rating::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(votes.len(), 2);
    let first = votes.iter().find(|v| v.ip == "10.0.0.1").unwrap();
    assert_eq!(first.star_id, stars[4].id);
}

#[tokio::test]
async fn rating_with_unknown_star_or_movie_is_rejected() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;

    assert!(catalog.rate_movie("10.0.0.1", movie.id, 999).await.is_err());
    assert!(catalog.rate_movie("10.0.0.1", 999, 1).await.is_err());
    assert!(rating::Entity::find().all(catalog.db()).await.unwrap().is_empty());
}
