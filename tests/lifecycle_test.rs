//! Referential actions and bulk operations.

mod helpers;

use kinoteka::entities::{movie, movie_shot, rating, review};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

async fn seed_shot(catalog: &kinoteka::catalog::Catalog, movie_id: i32) -> movie_shot::Model {
    movie_shot::ActiveModel {
        id: Default::default(),
        title: Set("Still".to_string()),
        description: Set(String::new()),
        image: Set("/media/still.jpg".to_string()),
        movie_id: Set(movie_id),
    }
    .insert(catalog.db())
    .await
    .unwrap()
}

#[tokio::test]
async fn deleting_a_movie_removes_its_children() {
    let catalog = helpers::test_catalog().await;
    let doomed = helpers::seed_movie(&catalog, "Doomed", "doomed", 2010, false).await;
    let kept = helpers::seed_movie(&catalog, "Kept", "kept", 2011, false).await;

    seed_shot(&catalog, doomed.id).await;
    seed_shot(&catalog, kept.id).await;
    helpers::seed_review(&catalog, doomed.id, "a", None).await;
    helpers::seed_review(&catalog, kept.id, "b", None).await;
    let stars = catalog.rating_stars().await.unwrap();
    catalog.rate_movie("10.0.0.1", doomed.id, stars[0].id).await.unwrap();
    catalog.rate_movie("10.0.0.1", kept.id, stars[0].id).await.unwrap();

    catalog.delete_movie(doomed.id).await.unwrap();

    assert!(catalog.movie_by_id(doomed.id).await.is_err());
    let shots = movie_shot::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].movie_id, kept.id);
    let reviews = review::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].movie_id, kept.id);
    let votes = rating::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].movie_id, kept.id);
}

#[tokio::test]
async fn deleting_a_category_detaches_movies_without_deleting_them() {
    let catalog = helpers::test_catalog().await;
    let category = helpers::seed_category(&catalog, "Features", "features").await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;

    let mut am: movie::ActiveModel = movie.clone().into();
    am.category_id = Set(Some(category.id));
    am.update(catalog.db()).await.unwrap();

    catalog.delete_category(category.id).await.unwrap();

    let survivor = catalog.movie_by_id(movie.id).await.unwrap();
    assert_eq!(survivor.category_id, None);
}

#[tokio::test]
async fn deleting_a_review_promotes_its_replies() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let parent = helpers::seed_review(&catalog, movie.id, "parent", None).await;
    let reply = helpers::seed_review(&catalog, movie.id, "reply", Some(parent.id)).await;

    catalog.delete_review(parent.id).await.unwrap();

    let top = catalog.top_level_reviews(movie.id).await.unwrap();
    assert_eq!(top.iter().map(|r| r.id).collect::<Vec<_>>(), vec![reply.id]);
}

#[tokio::test]
async fn deleting_a_star_drops_its_votes() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let stars = catalog.rating_stars().await.unwrap();
    catalog.rate_movie("10.0.0.1", movie.id, stars[0].id).await.unwrap();
    catalog.rate_movie("10.0.0.2", movie.id, stars[1].id).await.unwrap();

    catalog.delete_rating_star(stars[0].id).await.unwrap();

    let votes = rating::Entity::find().all(catalog.db()).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].star_id, stars[1].id);
}

#[tokio::test]
async fn bulk_draft_updates_touch_exactly_the_selected_rows() {
    let catalog = helpers::test_catalog().await;
    let a = helpers::seed_movie(&catalog, "A", "a", 2010, true).await;
    let b = helpers::seed_movie(&catalog, "B", "b", 2011, true).await;
    let c = helpers::seed_movie(&catalog, "C", "c", 2012, true).await;

    let rows = catalog.set_draft_many(&[a.id, b.id], false).await.unwrap();
    assert_eq!(rows, 2);

    assert!(!catalog.movie_by_id(a.id).await.unwrap().draft);
    assert!(!catalog.movie_by_id(b.id).await.unwrap().draft);
    assert!(catalog.movie_by_id(c.id).await.unwrap().draft);

    let rows = catalog.set_draft_many(&[c.id], true).await.unwrap();
    assert_eq!(rows, 1);

    let rows = catalog.set_draft_many(&[], true).await.unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn movie_relations_are_replaced_wholesale() {
    let catalog = helpers::test_catalog().await;
    let movie = helpers::seed_movie(&catalog, "M", "m", 2010, false).await;
    let a1 = helpers::seed_actor(&catalog, "Ada").await;
    let a2 = helpers::seed_actor(&catalog, "Ben").await;
    let g = helpers::seed_genre(&catalog, "Drama", "drama").await;

    catalog.set_movie_relations(movie.id, &[a1.id, a2.id], &[a1.id], &[g.id]).await.unwrap();

    let cast = catalog.movie_cast(movie.id).await.unwrap();
    assert_eq!(cast.len(), 2);
    let directors = catalog.movie_directors(movie.id).await.unwrap();
    assert_eq!(directors.iter().map(|a| a.id).collect::<Vec<_>>(), vec![a1.id]);

    // The same person can hold both roles; replacing drops stale rows.
    catalog.set_movie_relations(movie.id, &[a2.id], &[a2.id], &[]).await.unwrap();
    let cast = catalog.movie_cast(movie.id).await.unwrap();
    assert_eq!(cast.iter().map(|a| a.id).collect::<Vec<_>>(), vec![a2.id]);
    let directors = catalog.movie_directors(movie.id).await.unwrap();
    assert_eq!(directors.iter().map(|a| a.id).collect::<Vec<_>>(), vec![a2.id]);
    assert!(catalog.movie_genres(movie.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_slug_is_a_store_error() {
    let catalog = helpers::test_catalog().await;
    helpers::seed_movie(&catalog, "First", "same-slug", 2010, false).await;

    let dup = movie::ActiveModel {
        id: Default::default(),
        title: Set("Second".to_string()),
        tagline: Set(String::new()),
        description: Set(String::new()),
        poster: Set(String::new()),
        year: Set(2011),
        country: Set("USA".to_string()),
        world_premiere: Set("2020-01-01".to_string()),
        budget: Set(0),
        fees_in_usa: Set(0),
        fees_in_world: Set(0),
        category_id: Set(None),
        url: Set("same-slug".to_string()),
        draft: Set(false),
    }
    .insert(catalog.db())
    .await;

    assert!(dup.is_err());
    let count = movie::Entity::find()
        .filter(movie::Column::Url.eq("same-slug"))
        .all(catalog.db())
        .await
        .unwrap()
        .len();
    assert_eq!(count, 1);
}
