use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};

use crate::{
    entities::{
        actor, category, genre, movie, movie_actor, movie_director, movie_genre, movie_shot,
        rating, rating_star, review,
    },
    error::{AppError, AppResult},
    forms::ReviewForm,
    models::{Facets, MovieCard, MovieFilter, MoviePage, ReviewNode, build_review_tree},
};

/// All catalog reads and writes go through here. Referential actions
/// (cascade, set-null) are performed explicitly inside transactions; the
/// SQLite pool does not enforce them.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // ---- public read side ----

    /// Movies visible on the public site: draft = false, insertion order.
    pub async fn published_movies(&self) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find()
            .filter(movie::Column::Draft.eq(false))
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    /// Facet choices: every genre, and the distinct years of published movies.
    pub async fn facets(&self) -> AppResult<Facets> {
        let (genres, years) = futures::try_join!(
            async {
                genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await
            },
            async {
                movie::Entity::find()
                    .select_only()
                    .column(movie::Column::Year)
                    .filter(movie::Column::Draft.eq(false))
                    .distinct()
                    .order_by_asc(movie::Column::Year)
                    .into_tuple::<i32>()
                    .all(&self.db)
                    .await
            },
        )?;
        Ok(Facets { genres, years })
    }

    /// Published movies whose year is in `filter.years` OR whose genre set
    /// intersects `filter.genres`. A single select over `movie`, so a movie
    /// matching both clauses (or several genres) appears once. Empty `IN`
    /// lists match nothing, so an empty filter yields no rows.
    pub async fn filter_movies(&self, filter: &MovieFilter) -> AppResult<Vec<movie::Model>> {
        let genre_movie_ids = self.movie_ids_for_genres(&filter.genres).await?;

        let movies = movie::Entity::find()
            .filter(movie::Column::Draft.eq(false))
            .filter(
                Condition::any()
                    .add(movie::Column::Year.is_in(filter.years.iter().copied()))
                    .add(movie::Column::Id.is_in(genre_movie_ids)),
            )
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    /// Same predicate as `filter_movies`, projected for the JSON endpoint.
    pub async fn filter_movie_cards(&self, filter: &MovieFilter) -> AppResult<Vec<MovieCard>> {
        let movies = self.filter_movies(filter).await?;
        Ok(movies.into_iter().map(MovieCard::from).collect())
    }

    async fn movie_ids_for_genres(&self, genres: &[i32]) -> AppResult<Vec<i32>> {
        if genres.is_empty() {
            return Ok(Vec::new());
        }
        let ids = movie_genre::Entity::find()
            .select_only()
            .column(movie_genre::Column::MovieId)
            .filter(movie_genre::Column::GenreId.is_in(genres.iter().copied()))
            .distinct()
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    /// Slug lookup for the public detail page. Deliberately does not check
    /// `draft`: a direct URL reaches an unpublished movie.
    pub async fn movie_by_slug(&self, slug: &str) -> AppResult<movie::Model> {
        movie::Entity::find()
            .filter(movie::Column::Url.eq(slug))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn movie_by_id(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)
    }

    pub async fn actor_by_name(&self, name: &str) -> AppResult<actor::Model> {
        actor::Entity::find()
            .filter(actor::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Everything the detail template needs for one movie.
    pub async fn movie_page(&self, slug: &str) -> AppResult<MoviePage> {
        let movie = self.movie_by_slug(slug).await?;

        let category = match movie.category_id {
            Some(id) => category::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let (actors, directors, genres, shots, reviews) = futures::try_join!(
            self.movie_cast(movie.id),
            self.movie_directors(movie.id),
            self.movie_genres(movie.id),
            self.movie_shots(movie.id),
            self.review_tree(movie.id),
        )?;

        Ok(MoviePage { movie, category, actors, directors, genres, shots, reviews })
    }

    pub async fn movie_cast(&self, movie_id: i32) -> AppResult<Vec<actor::Model>> {
        let ids = movie_actor::Entity::find()
            .select_only()
            .column(movie_actor::Column::ActorId)
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        self.actors_by_ids(ids).await
    }

    pub async fn movie_directors(&self, movie_id: i32) -> AppResult<Vec<actor::Model>> {
        let ids = movie_director::Entity::find()
            .select_only()
            .column(movie_director::Column::ActorId)
            .filter(movie_director::Column::MovieId.eq(movie_id))
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        self.actors_by_ids(ids).await
    }

    async fn actors_by_ids(&self, ids: Vec<i32>) -> AppResult<Vec<actor::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let actors = actor::Entity::find()
            .filter(actor::Column::Id.is_in(ids))
            .order_by_asc(actor::Column::Name)
            .all(&self.db)
            .await?;
        Ok(actors)
    }

    pub async fn movie_genres(&self, movie_id: i32) -> AppResult<Vec<genre::Model>> {
        let ids = movie_genre::Entity::find()
            .select_only()
            .column(movie_genre::Column::GenreId)
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let genres = genre::Entity::find()
            .filter(genre::Column::Id.is_in(ids))
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?;
        Ok(genres)
    }

    pub async fn movie_shots(&self, movie_id: i32) -> AppResult<Vec<movie_shot::Model>> {
        let shots = movie_shot::Entity::find()
            .filter(movie_shot::Column::MovieId.eq(movie_id))
            .order_by_asc(movie_shot::Column::Id)
            .all(&self.db)
            .await?;
        Ok(shots)
    }

    /// Exactly the reviews with no parent, insertion order. Replies are the
    /// caller's concern (see `review_tree`).
    pub async fn top_level_reviews(&self, movie_id: i32) -> AppResult<Vec<review::Model>> {
        let reviews = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::ParentId.is_null())
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;
        Ok(reviews)
    }

    /// Top-level reviews with their replies nested underneath.
    pub async fn review_tree(&self, movie_id: i32) -> AppResult<Vec<ReviewNode>> {
        let reviews = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;
        Ok(build_review_tree(reviews))
    }

    // ---- public write side ----

    /// Persist a validated review. `parent` is stored verbatim when
    /// supplied; nothing checks it names a review of the same movie.
    pub async fn insert_review(
        &self,
        movie_id: i32,
        form: &ReviewForm,
    ) -> AppResult<review::Model> {
        let model = review::ActiveModel {
            id: Default::default(),
            email: Set(form.email.clone()),
            name: Set(form.name.clone()),
            text: Set(form.text.clone()),
            parent_id: Set(form.parent),
            movie_id: Set(movie_id),
        };
        let inserted = model.insert(&self.db).await?;
        Ok(inserted)
    }

    /// One vote per (ip, movie): an existing vote has its star replaced,
    /// otherwise a new row is inserted.
    pub async fn rate_movie(&self, ip: &str, movie_id: i32, star_id: i32) -> AppResult<()> {
        rating_star::Entity::find_by_id(star_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        self.movie_by_id(movie_id).await?;

        let existing = rating::Entity::find()
            .filter(rating::Column::Ip.eq(ip))
            .filter(rating::Column::MovieId.eq(movie_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(vote) => {
                let mut vote: rating::ActiveModel = vote.into();
                vote.star_id = Set(star_id);
                vote.update(&self.db).await?;
            },
            None => {
                let vote = rating::ActiveModel {
                    id: Default::default(),
                    ip: Set(ip.to_string()),
                    star_id: Set(star_id),
                    movie_id: Set(movie_id),
                };
                vote.insert(&self.db).await?;
            },
        }
        Ok(())
    }

    // ---- back-office write side ----

    /// Flip `draft` on the selected movies in one transaction; returns the
    /// number of rows touched.
    pub async fn set_draft_many(&self, ids: &[i32], draft: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let txn = self.db.begin().await?;
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Draft, Expr::value(draft))
            .filter(movie::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(res.rows_affected)
    }

    /// Replace a movie's cast, director and genre relations.
    pub async fn set_movie_relations(
        &self,
        movie_id: i32,
        actors: &[i32],
        directors: &[i32],
        genres: &[i32],
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        for actor_id in actors {
            movie_actor::ActiveModel { movie_id: Set(movie_id), actor_id: Set(*actor_id) }
                .insert(&txn)
                .await?;
        }

        movie_director::Entity::delete_many()
            .filter(movie_director::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        for actor_id in directors {
            movie_director::ActiveModel { movie_id: Set(movie_id), actor_id: Set(*actor_id) }
                .insert(&txn)
                .await?;
        }

        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        for genre_id in genres {
            movie_genre::ActiveModel { movie_id: Set(movie_id), genre_id: Set(*genre_id) }
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    // ---- deletes with referential actions ----

    /// Movie deletion cascades to shots, ratings, reviews and join rows.
    pub async fn delete_movie(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        movie_shot::Entity::delete_many()
            .filter(movie_shot::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        rating::Entity::delete_many()
            .filter(rating::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        review::Entity::delete_many()
            .filter(review::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_director::Entity::delete_many()
            .filter(movie_director::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Category deletion nulls out referencing movies, never cascades.
    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        movie::Entity::update_many()
            .col_expr(movie::Column::CategoryId, Expr::value(None::<i32>))
            .filter(movie::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Deleting a review promotes its replies to top level.
    pub async fn delete_review(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        review::Entity::update_many()
            .col_expr(review::Column::ParentId, Expr::value(None::<i32>))
            .filter(review::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;
        review::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Deleting a star drops every vote that referenced it.
    pub async fn delete_rating_star(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        rating::Entity::delete_many()
            .filter(rating::Column::StarId.eq(id))
            .exec(&txn)
            .await?;
        rating_star::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn delete_actor(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::ActorId.eq(id))
            .exec(&txn)
            .await?;
        movie_director::Entity::delete_many()
            .filter(movie_director::Column::ActorId.eq(id))
            .exec(&txn)
            .await?;
        actor::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::GenreId.eq(id))
            .exec(&txn)
            .await?;
        genre::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn delete_movie_shot(&self, id: i32) -> AppResult<()> {
        movie_shot::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn delete_rating(&self, id: i32) -> AppResult<()> {
        rating::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn rating_stars(&self) -> AppResult<Vec<rating_star::Model>> {
        let stars = rating_star::Entity::find()
            .order_by_asc(rating_star::Column::Value)
            .all(&self.db)
            .await?;
        Ok(stars)
    }
}
