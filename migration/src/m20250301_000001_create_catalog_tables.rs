use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(pk_auto(Category::Id))
                    .col(string(Category::Name))
                    .col(text(Category::Description))
                    .col(string_uniq(Category::Url))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string(Genre::Name))
                    .col(text(Genre::Description))
                    .col(string_uniq(Genre::Url))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(string(Actor::Name))
                    .col(integer(Actor::Age).default(0))
                    .col(text(Actor::Description))
                    .col(string(Actor::Image))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string(Movie::Title))
                    .col(string(Movie::Tagline).default(""))
                    .col(text(Movie::Description))
                    .col(string(Movie::Poster))
                    .col(integer(Movie::Year).default(2020))
                    .col(string(Movie::Country))
                    .col(string(Movie::WorldPremiere))
                    .col(big_integer(Movie::Budget).default(0))
                    .col(big_integer(Movie::FeesInUsa).default(0))
                    .col(big_integer(Movie::FeesInWorld).default(0))
                    .col(integer_null(Movie::CategoryId))
                    .col(string_uniq(Movie::Url))
                    .col(boolean(Movie::Draft).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_category_id")
                            .from(Movie::Table, Movie::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_draft_year")
                    .table(Movie::Table)
                    .col(Movie::Draft)
                    .col(Movie::Year)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActor::Table)
                    .if_not_exists()
                    .col(integer(MovieActor::MovieId))
                    .col(integer(MovieActor::ActorId))
                    .primary_key(
                        Index::create().col(MovieActor::MovieId).col(MovieActor::ActorId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieDirector::Table)
                    .if_not_exists()
                    .col(integer(MovieDirector::MovieId))
                    .col(integer(MovieDirector::ActorId))
                    .primary_key(
                        Index::create().col(MovieDirector::MovieId).col(MovieDirector::ActorId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(integer(MovieGenre::MovieId))
                    .col(integer(MovieGenre::GenreId))
                    .primary_key(
                        Index::create().col(MovieGenre::MovieId).col(MovieGenre::GenreId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genre_genre_id")
                    .table(MovieGenre::Table)
                    .col(MovieGenre::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieShot::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieShot::Id))
                    .col(string(MovieShot::Title))
                    .col(text(MovieShot::Description))
                    .col(string(MovieShot::Image))
                    .col(integer(MovieShot::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_shot_movie_id")
                            .from(MovieShot::Table, MovieShot::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RatingStar::Table)
                    .if_not_exists()
                    .col(pk_auto(RatingStar::Id))
                    .col(integer(RatingStar::Value).default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(pk_auto(Rating::Id))
                    .col(string_len(Rating::Ip, 15))
                    .col(integer(Rating::StarId))
                    .col(integer(Rating::MovieId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_ip_movie_id")
                    .table(Rating::Table)
                    .col(Rating::Ip)
                    .col(Rating::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(pk_auto(Review::Id))
                    .col(string(Review::Email))
                    .col(string_len(Review::Name, 100))
                    .col(text(Review::Text))
                    .col(integer_null(Review::ParentId))
                    .col(integer(Review::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_movie_id")
                            .from(Review::Table, Review::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_parent_id")
                            .from(Review::Table, Review::ParentId)
                            .to(Review::Table, Review::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_movie_id")
                    .table(Review::Table)
                    .col(Review::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(RatingStar::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieShot::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieGenre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieDirector::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieActor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
    Name,
    Description,
    Url,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
    Description,
    Url,
}

#[derive(DeriveIden)]
enum Actor {
    Table,
    Id,
    Name,
    Age,
    Description,
    Image,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Tagline,
    Description,
    Poster,
    Year,
    Country,
    WorldPremiere,
    Budget,
    FeesInUsa,
    FeesInWorld,
    CategoryId,
    Url,
    Draft,
}

#[derive(DeriveIden)]
enum MovieActor {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum MovieDirector {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum MovieGenre {
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum MovieShot {
    Table,
    Id,
    Title,
    Description,
    Image,
    MovieId,
}

#[derive(DeriveIden)]
enum RatingStar {
    Table,
    Id,
    Value,
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    Id,
    Ip,
    StarId,
    MovieId,
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    Email,
    Name,
    Text,
    ParentId,
    MovieId,
}
