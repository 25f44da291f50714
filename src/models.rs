use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::entities::{actor, category, genre, movie, movie_shot, review};

/// Criteria parsed from the filter endpoints' query string. Year and genre
/// clauses combine with OR, not AND.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieFilter {
    pub years: Vec<i32>,
    pub genres: Vec<i32>,
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.genres.is_empty()
    }
}

/// Projection served by the JSON filter endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieCard {
    pub title: String,
    pub tagline: String,
    pub url: String,
    pub poster: String,
}

impl From<movie::Model> for MovieCard {
    fn from(m: movie::Model) -> Self {
        Self { title: m.title, tagline: m.tagline, url: m.url, poster: m.poster }
    }
}

/// Facet choices rendered alongside every public listing.
#[derive(Clone, Debug)]
pub struct Facets {
    pub genres: Vec<genre::Model>,
    pub years: Vec<i32>,
}

/// A review with its replies attached.
#[derive(Clone, Debug)]
pub struct ReviewNode {
    pub review: review::Model,
    pub replies: Vec<ReviewNode>,
}

/// Everything the movie detail template renders.
#[derive(Clone, Debug)]
pub struct MoviePage {
    pub movie: movie::Model,
    pub category: Option<category::Model>,
    pub actors: Vec<actor::Model>,
    pub directors: Vec<actor::Model>,
    pub genres: Vec<genre::Model>,
    pub shots: Vec<movie_shot::Model>,
    pub reviews: Vec<ReviewNode>,
}

/// Arrange one movie's reviews into a tree rooted at the top-level reviews.
///
/// A reply whose parent is missing from the set (deleted, or attached to
/// another movie) renders at top level instead of disappearing; a review
/// naming itself as parent is treated the same way.
pub fn build_review_tree(reviews: Vec<review::Model>) -> Vec<ReviewNode> {
    let ids: HashSet<i32> = reviews.iter().map(|r| r.id).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<i32, Vec<review::Model>> = HashMap::new();
    for r in reviews {
        match r.parent_id {
            Some(p) if p != r.id && ids.contains(&p) => children.entry(p).or_default().push(r),
            _ => roots.push(r),
        }
    }

    roots.into_iter().map(|r| attach_replies(r, &mut children)).collect()
}

fn attach_replies(
    review: review::Model,
    children: &mut HashMap<i32, Vec<review::Model>>,
) -> ReviewNode {
    let replies = children
        .remove(&review.id)
        .unwrap_or_default()
        .into_iter()
        .map(|r| attach_replies(r, children))
        .collect();
    ReviewNode { review, replies }
}
