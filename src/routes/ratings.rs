use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    response::Response,
};

use super::movie_by_id;
use crate::{
    AppState,
    ctx::Ctx,
    entities::movie,
    error::AppResult,
    forms::{FormErrors, RatingInput},
    templates::{
        catalog::{RatingForm, rating_form},
        movie_href,
    },
};

const INFO_AUTHENTICATE: &str = "Please, authenticate to rate a movie";
const WARN_DUPLICATE: &str = "You cannot have more than one rating per movie";
const WARN_NOTHING_TO_UPDATE: &str = "You have no rating on this movie to update";
const WARN_NOTHING_TO_DELETE: &str = "You have no rating on the movie to delete.";
const RATED: &str = "You successfully rated this movie";
const UPDATED: &str = "You successfully updated your rating of the movie";
const DELETED: &str = "You successfully deleted your rating on the movie.";

fn render_create(
    ctx: Ctx,
    movie: &movie::Model,
    selected: &str,
    errors: &FormErrors,
) -> Response {
    let form = RatingForm {
        heading: "Rate movie",
        action: format!("/movies/{}/rate/", movie.id),
        selected,
        errors,
    };
    ctx.render("Rate movie", rating_form(movie, form))
}

fn render_update(
    ctx: Ctx,
    movie: &movie::Model,
    selected: &str,
    errors: &FormErrors,
) -> Response {
    let form = RatingForm {
        heading: "Update your rating",
        action: format!("/movies/{}/rate/update/", movie.id),
        selected,
        errors,
    };
    ctx.render("Update rating", rating_form(movie, form))
}

pub async fn rate_form(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    let movie = movie_by_id(&state, &movie).await?;
    let Some(user_id) = ctx.user_id() else {
        ctx.info(INFO_AUTHENTICATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    };
    if state.store.find_rating(movie.id, user_id).await?.is_some() {
        ctx.warning(WARN_DUPLICATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    }
    Ok(render_create(ctx, &movie, "", &FormErrors::default()))
}

pub async fn rate(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
    Form(input): Form<RatingInput>,
) -> AppResult<Response> {
    let movie = movie_by_id(&state, &movie).await?;
    let Some(user_id) = ctx.user_id() else {
        ctx.info(INFO_AUTHENTICATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    };
    if state.store.find_rating(movie.id, user_id).await?.is_some() {
        ctx.warning(WARN_DUPLICATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    }

    let value = match input.validate() {
        Ok(value) => value,
        Err(errors) => {
            let selected = input.rating.unwrap_or_default();
            return Ok(render_create(ctx, &movie, &selected, &errors));
        },
    };

    match state.store.create_rating(movie.id, user_id, value).await? {
        Ok(rating) => {
            tracing::info!(movie_id = movie.id, user_id, rating = rating.rating, "movie rated");
            ctx.success(RATED);
        },
        Err(_) => {
            tracing::debug!(movie_id = movie.id, user_id, "duplicate rating refused");
            ctx.warning(WARN_DUPLICATE);
        },
    }
    Ok(ctx.redirect(&movie_href(&movie.slug)))
}

pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    let Some(user_id) = ctx.user_id() else {
        return Ok(ctx.login_gate());
    };
    let movie = movie_by_id(&state, &movie).await?;
    let Some(existing) = state.store.find_rating(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_UPDATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    };
    let selected = existing.rating.to_string();
    Ok(render_update(ctx, &movie, &selected, &FormErrors::default()))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
    Form(input): Form<RatingInput>,
) -> AppResult<Response> {
    let Some(user_id) = ctx.user_id() else {
        return Ok(ctx.login_gate());
    };
    let movie = movie_by_id(&state, &movie).await?;
    let Some(existing) = state.store.find_rating(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_UPDATE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    };

    let value = match input.validate() {
        Ok(value) => value,
        Err(errors) => {
            let selected = input.rating.unwrap_or_default();
            return Ok(render_update(ctx, &movie, &selected, &errors));
        },
    };

    state.store.update_rating(existing, value).await?;
    tracing::info!(movie_id = movie.id, user_id, rating = value, "rating updated");
    ctx.success(UPDATED);
    Ok(ctx.redirect(&movie_href(&movie.slug)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    let Some(user_id) = ctx.user_id() else {
        return Ok(ctx.login_gate());
    };
    let movie = movie_by_id(&state, &movie).await?;
    let Some(existing) = state.store.find_rating(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_DELETE);
        return Ok(ctx.redirect(&movie_href(&movie.slug)));
    };

    state.store.delete_rating(existing).await?;
    tracing::info!(movie_id = movie.id, user_id, "rating deleted");
    ctx.success(DELETED);
    Ok(ctx.redirect(&movie_href(&movie.slug)))
}
