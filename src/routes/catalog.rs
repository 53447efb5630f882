use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    AppState,
    ctx::Ctx,
    entities::{actor, director, genre, movie},
    error::{AppError, AppResult},
    store::PersonKind,
    templates,
};

pub async fn index(State(state): State<Arc<AppState>>, ctx: Ctx) -> AppResult<Response> {
    let genres = state.store.genre_index().await?;
    Ok(ctx.render("Genres", templates::catalog::index(&genres)))
}

pub async fn movies_by_genre(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ctx: Ctx,
) -> AppResult<Response> {
    let genre = state.store.find_by(genre::Column::Slug, slug).await?.ok_or(AppError::NotFound)?;
    let movies = state.store.movies_with_genre(genre.id).await?;
    Ok(ctx.render(&genre.name, templates::catalog::movies_by_genre(&genre, &movies)))
}

/// The `{movie}` segment is the slug here and the numeric id everywhere else.
pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ctx: Ctx,
) -> AppResult<Response> {
    let movie = state.store.find_by(movie::Column::Slug, slug).await?.ok_or(AppError::NotFound)?;
    let detail = state.store.movie_detail(movie, ctx.user_id()).await?;
    let title = detail.movie.title.clone();
    let body = templates::catalog::movie_detail(&detail, ctx.user.is_some());
    Ok(ctx.render(&title, body))
}

pub async fn director_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ctx: Ctx,
) -> AppResult<Response> {
    let director = state
        .store
        .find_by(director::Column::SluggedName, slug)
        .await?
        .ok_or(AppError::NotFound)?;
    let movies = state.store.movies_by_director(director.id).await?;
    let body = templates::catalog::person_page(
        PersonKind::Director,
        &director.name,
        &director.photo,
        &movies,
    );
    Ok(ctx.render(&director.name, body))
}

pub async fn actor_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ctx: Ctx,
) -> AppResult<Response> {
    let actor =
        state.store.find_by(actor::Column::SluggedName, slug).await?.ok_or(AppError::NotFound)?;
    let movies = state.store.movies_with_actor(actor.id).await?;
    let body =
        templates::catalog::person_page(PersonKind::Actor, &actor.name, &actor.photo, &movies);
    Ok(ctx.render(&actor.name, body))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
    ctx: Ctx,
) -> AppResult<Response> {
    let q = query.q.unwrap_or_default();
    if q.is_empty() {
        return Ok(ctx.render("Search", templates::catalog::empty_search()));
    }

    let results = state.store.search(&q).await?;
    tracing::debug!(query = %q, results = results.number_of_results(), "search");
    Ok(ctx.render("Search results", templates::catalog::search_results(&q, &results)))
}
