use std::collections::HashMap;

use jiff::civil::Date;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

use super::{Conflict, Protected, Store, is_foreign_key_violation, is_unique_violation};
use crate::{
    entities::{actor, director, genre, movie, movie_actor, movie_genre, rating},
    error::AppResult,
    models::{Country, GenreCount, MovieCard, MovieDetail, MovieRow, RatingStats, SearchResults},
    slug::slugify,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PersonKind {
    Director,
    Actor,
}

impl PersonKind {
    pub fn label(self) -> &'static str {
        match self {
            PersonKind::Director => "Director",
            PersonKind::Actor => "Actor",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            PersonKind::Director => "directors",
            PersonKind::Actor => "actors",
        }
    }
}

/// Director and Actor share a shape; the slug is derived on write.
#[derive(Clone, Debug)]
pub struct NewPerson {
    pub name: String,
    pub photo: String,
}

#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub synopsis: String,
    pub release_date: Date,
    pub country: Country,
    pub poster: String,
    pub director_id: i32,
    pub actor_ids: Vec<i32>,
    pub genres: Vec<String>,
}

#[derive(Debug, FromQueryResult)]
struct StatsRow {
    movie_id: i32,
    avg_rating: Option<f64>,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct GenreUsage {
    genre_id: i32,
    number_of_movies: i64,
}

impl Store {
    pub async fn create_person(
        &self,
        kind: PersonKind,
        person: NewPerson,
    ) -> AppResult<Result<i32, Conflict>> {
        let name = person.name.trim().to_string();
        let slug = slugify(&name);

        let inserted = match kind {
            PersonKind::Director => {
                let taken = director::Entity::find()
                    .filter(
                        director::Column::Name
                            .eq(name.as_str())
                            .or(director::Column::SluggedName.eq(slug.as_str())),
                    )
                    .count(&self.db)
                    .await?;
                if taken > 0 {
                    return Ok(Err(Conflict));
                }
                director::Entity::insert(director::ActiveModel {
                    id: Default::default(),
                    name: Set(name),
                    slugged_name: Set(slug),
                    photo: Set(person.photo),
                })
                .exec(&self.db)
                .await
                .map(|r| r.last_insert_id)
            },
            PersonKind::Actor => {
                let taken = actor::Entity::find()
                    .filter(
                        actor::Column::Name
                            .eq(name.as_str())
                            .or(actor::Column::SluggedName.eq(slug.as_str())),
                    )
                    .count(&self.db)
                    .await?;
                if taken > 0 {
                    return Ok(Err(Conflict));
                }
                actor::Entity::insert(actor::ActiveModel {
                    id: Default::default(),
                    name: Set(name),
                    slugged_name: Set(slug),
                    photo: Set(person.photo),
                })
                .exec(&self.db)
                .await
                .map(|r| r.last_insert_id)
            },
        };

        match inserted {
            Ok(id) => Ok(Ok(id)),
            Err(err) if is_unique_violation(&err) => Ok(Err(Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// Refused while any movie still names the director.
    pub async fn delete_director(
        &self,
        id: i32,
    ) -> AppResult<Result<Option<director::Model>, Protected>> {
        let Some(found) = director::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(Ok(None));
        };
        let referencing =
            movie::Entity::find().filter(movie::Column::DirectorId.eq(id)).count(&self.db).await?;
        if referencing > 0 {
            return Ok(Err(Protected));
        }
        match director::Entity::delete_by_id(id).exec(&self.db).await {
            Ok(_) => Ok(Ok(Some(found))),
            Err(err) if is_foreign_key_violation(&err) => Ok(Err(Protected)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_actor(&self, id: i32) -> AppResult<Option<actor::Model>> {
        let Some(found) = actor::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        actor::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(Some(found))
    }

    /// Ratings, reviews and link rows go with the movie.
    pub async fn delete_movie(&self, id: i32) -> AppResult<Option<movie::Model>> {
        let Some(found) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(Some(found))
    }

    /// Inserts the movie with its actor and genre links in one transaction.
    /// Unknown genres are created on the way.
    pub async fn create_movie(&self, new: NewMovie) -> AppResult<Result<i32, Conflict>> {
        let title = new.title.trim().to_string();
        let slug = slugify(&title);

        let taken = movie::Entity::find()
            .filter(
                movie::Column::Title.eq(title.as_str()).or(movie::Column::Slug.eq(slug.as_str())),
            )
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Ok(Err(Conflict));
        }

        let txn = self.db.begin().await?;

        let inserted = movie::Entity::insert(movie::ActiveModel {
            id: Default::default(),
            title: Set(title),
            slug: Set(slug),
            synopsis: Set(new.synopsis),
            release_date: Set(new.release_date.to_string()),
            country: Set(new.country.as_code().to_string()),
            poster: Set(new.poster),
            director_id: Set(new.director_id),
        })
        .exec(&txn)
        .await;

        let movie_id = match inserted {
            Ok(res) => res.last_insert_id,
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                return Ok(Err(Conflict));
            },
            Err(err) => return Err(err.into()),
        };

        for actor_id in new.actor_ids {
            movie_actor::Entity::insert(movie_actor::ActiveModel {
                movie_id: Set(movie_id),
                actor_id: Set(actor_id),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        for name in new.genres {
            let name = name.trim().to_string();
            let slug = slugify(&name);
            if slug.is_empty() {
                continue;
            }
            let existing = genre::Entity::find()
                .filter(genre::Column::Slug.eq(slug.as_str()))
                .one(&txn)
                .await?;
            let genre_id = match existing {
                Some(g) => g.id,
                None => {
                    genre::ActiveModel { id: Default::default(), name: Set(name), slug: Set(slug) }
                        .insert(&txn)
                        .await?
                        .id
                },
            };
            movie_genre::Entity::insert(movie_genre::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;
        tracing::info!(movie_id, "movie created");
        Ok(Ok(movie_id))
    }

    pub async fn rating_stats(&self, movie_ids: &[i32]) -> AppResult<HashMap<i32, RatingStats>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = rating::Entity::find()
            .select_only()
            .column(rating::Column::MovieId)
            .column_as(SimpleExpr::from(Func::avg(Expr::col(rating::Column::Rating))), "avg_rating")
            .column_as(SimpleExpr::from(Func::count(Expr::col(rating::Column::Id))), "total")
            .filter(rating::Column::MovieId.is_in(movie_ids.iter().copied()))
            .group_by(rating::Column::MovieId)
            .into_model::<StatsRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.movie_id, RatingStats { average: r.avg_rating, count: r.total }))
            .collect())
    }

    async fn cards(
        &self,
        rows: Vec<(movie::Model, Option<director::Model>)>,
    ) -> AppResult<Vec<MovieCard>> {
        let ids: Vec<i32> = rows.iter().map(|(m, _)| m.id).collect();
        let stats = self.rating_stats(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|(movie, director)| {
                let avg_rating = stats.get(&movie.id).and_then(|s| s.average);
                MovieCard { movie, director, avg_rating }
            })
            .collect())
    }

    /// Genres attached to at least one movie, by name.
    pub async fn genre_index(&self) -> AppResult<Vec<GenreCount>> {
        let usage: HashMap<i32, i64> = movie_genre::Entity::find()
            .select_only()
            .column(movie_genre::Column::GenreId)
            .column_as(
                SimpleExpr::from(Func::count(Expr::col(movie_genre::Column::MovieId))),
                "number_of_movies",
            )
            .group_by(movie_genre::Column::GenreId)
            .into_model::<GenreUsage>()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.genre_id, u.number_of_movies))
            .collect();

        let genres = genre::Entity::find()
            .filter(genre::Column::Id.is_in(usage.keys().copied()))
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?;

        Ok(genres
            .into_iter()
            .map(|genre| {
                let number_of_movies = usage.get(&genre.id).copied().unwrap_or_default();
                GenreCount { genre, number_of_movies }
            })
            .collect())
    }

    pub async fn movies_with_genre(&self, genre_id: i32) -> AppResult<Vec<MovieCard>> {
        let rows = movie::Entity::find()
            .inner_join(movie_genre::Entity)
            .filter(movie_genre::Column::GenreId.eq(genre_id))
            .find_also_related(director::Entity)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?;
        self.cards(rows).await
    }

    pub async fn movies_by_director(&self, director_id: i32) -> AppResult<Vec<MovieCard>> {
        let rows = movie::Entity::find()
            .filter(movie::Column::DirectorId.eq(director_id))
            .find_also_related(director::Entity)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?;
        self.cards(rows).await
    }

    pub async fn movies_with_actor(&self, actor_id: i32) -> AppResult<Vec<MovieCard>> {
        let rows = movie::Entity::find()
            .inner_join(movie_actor::Entity)
            .filter(movie_actor::Column::ActorId.eq(actor_id))
            .find_also_related(director::Entity)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?;
        self.cards(rows).await
    }

    pub async fn movie_actors(&self, movie_id: i32) -> AppResult<Vec<actor::Model>> {
        Ok(actor::Entity::find()
            .inner_join(movie_actor::Entity)
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .order_by_asc(actor::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn movie_genres(&self, movie_id: i32) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find()
            .inner_join(movie_genre::Entity)
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Everything the detail page shows; `viewer` adds their own rating.
    pub async fn movie_detail(
        &self,
        movie: movie::Model,
        viewer: Option<i32>,
    ) -> AppResult<MovieDetail> {
        let director = director::Entity::find_by_id(movie.director_id).one(&self.db).await?;
        let actors = self.movie_actors(movie.id).await?;
        let genres = self.movie_genres(movie.id).await?;
        let stats = self.rating_stats(&[movie.id]).await?.remove(&movie.id).unwrap_or_default();
        let own_rating = match viewer {
            Some(owner_id) => self.find_rating(movie.id, owner_id).await?,
            None => None,
        };
        let release_date = movie.release_date.parse::<Date>().ok();

        Ok(MovieDetail { movie, director, actors, genres, stats, release_date, own_rating })
    }

    /// Three independent case-insensitive substring matches.
    pub async fn search(&self, query: &str) -> AppResult<SearchResults> {
        let actors = actor::Entity::find()
            .filter(icontains(actor::Column::Name, query))
            .order_by_asc(actor::Column::Name)
            .all(&self.db)
            .await?;
        let directors = director::Entity::find()
            .filter(icontains(director::Column::Name, query))
            .order_by_asc(director::Column::Name)
            .all(&self.db)
            .await?;
        let movies = movie::Entity::find()
            .filter(icontains(movie::Column::Title, query))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?;
        Ok(SearchResults { actors, directors, movies })
    }

    pub async fn list_directors(&self, filter: Option<&str>) -> AppResult<Vec<director::Model>> {
        let mut select = director::Entity::find().order_by_asc(director::Column::Name);
        if let Some(q) = filter {
            select = select.filter(icontains(director::Column::Name, q));
        }
        Ok(select.all(&self.db).await?)
    }

    pub async fn list_actors(&self, filter: Option<&str>) -> AppResult<Vec<actor::Model>> {
        let mut select = actor::Entity::find().order_by_asc(actor::Column::Name);
        if let Some(q) = filter {
            select = select.filter(icontains(actor::Column::Name, q));
        }
        Ok(select.all(&self.db).await?)
    }

    /// Admin listing: movies with director name and genre names.
    pub async fn list_movie_rows(&self, filter: Option<&str>) -> AppResult<Vec<MovieRow>> {
        let mut select = movie::Entity::find()
            .find_also_related(director::Entity)
            .order_by_asc(movie::Column::Title);
        if let Some(q) = filter {
            select = select.filter(
                icontains(movie::Column::Title, q)
                    .or(icontains(movie::Column::Slug, q))
                    .or(icontains(movie::Column::Country, q)),
            );
        }
        let rows = select.all(&self.db).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (movie, director) in rows {
            let genres = self.movie_genres(movie.id).await?.into_iter().map(|g| g.name).collect();
            out.push(MovieRow {
                director_name: director.map(|d| d.name).unwrap_or_default(),
                genres,
                movie,
            });
        }
        Ok(out)
    }
}

/// `column LIKE '%needle%'` with LIKE wildcards in the needle escaped.
/// SQLite's `LIKE` ignores ASCII case only; other letters match exactly, so
/// neither side is folded.
fn icontains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    Expr::col((C::EntityName::default(), column))
        .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}
