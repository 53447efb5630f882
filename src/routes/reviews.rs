use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    response::Response,
};

use super::movie_by_id;
use crate::{
    AppState,
    ctx::Ctx,
    entities::{movie, rating},
    error::AppResult,
    forms::{FormErrors, ReviewInput},
    templates::{
        catalog::{self, ReviewForm},
        reviews_href,
    },
};

const INFO_AUTHENTICATE: &str = "Please, authenticate to publish your review on the movie";
const WARN_DUPLICATE: &str = "You can have only one review per movie";
const WARN_NOTHING_TO_UPDATE: &str = "You have not reviewed the movie.";
const WARN_NOTHING_TO_DELETE: &str = "You have no review of the movie to delete.";
const PUBLISHED: &str = "You successfully published your review on the movie";
const UPDATED: &str = "You successfully updated your review of the movie.";
const DELETED: &str = "You successfully deleted your review of the movie.";

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    ctx: Ctx,
) -> AppResult<Response> {
    let movie = movie_by_id(&state, &movie).await?;
    let entries = state.store.reviews_for_movie(movie.id).await?;
    let user_has_review =
        ctx.user_id().is_some_and(|id| entries.iter().any(|e| e.author.id == id));
    let body = catalog::review_list(&movie, &entries, user_has_review, ctx.user.is_some());
    Ok(ctx.render(&format!("Reviews of {}", movie.title), body))
}

fn render_create(
    ctx: Ctx,
    movie: &movie::Model,
    content: &str,
    errors: &FormErrors,
) -> Response {
    let form = ReviewForm {
        heading: "Review movie",
        action: format!("/movies/{}/review/", movie.id),
        content,
        own_rating: None,
        errors,
    };
    ctx.render("Review movie", catalog::review_form(movie, form))
}

fn render_update(
    ctx: Ctx,
    movie: &movie::Model,
    content: &str,
    own_rating: Option<&rating::Model>,
    errors: &FormErrors,
) -> Response {
    let form = ReviewForm {
        heading: "Update your review",
        action: format!("/movies/{}/reviews/detail/", movie.id),
        content,
        own_rating,
        errors,
    };
    ctx.render("Update review", catalog::review_form(movie, form))
}

pub async fn review_form(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    let movie = movie_by_id(&state, &movie).await?;
    let Some(user_id) = ctx.user_id() else {
        ctx.info(INFO_AUTHENTICATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    };
    if state.store.find_review(movie.id, user_id).await?.is_some() {
        ctx.warning(WARN_DUPLICATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    }
    Ok(render_create(ctx, &movie, "", &FormErrors::default()))
}

pub async fn review(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
    Form(input): Form<ReviewInput>,
) -> AppResult<Response> {
    let movie = movie_by_id(&state, &movie).await?;
    let Some(user_id) = ctx.user_id() else {
        ctx.info(INFO_AUTHENTICATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    };
    if state.store.find_review(movie.id, user_id).await?.is_some() {
        ctx.warning(WARN_DUPLICATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    }

    let content = match input.validate() {
        Ok(content) => content,
        Err(errors) => {
            let raw = input.content.unwrap_or_default();
            return Ok(render_create(ctx, &movie, &raw, &errors));
        },
    };

    match state.store.create_review(movie.id, user_id, content).await? {
        Ok(review) => {
            tracing::info!(
                movie_id = movie.id,
                user_id,
                review_id = review.id,
                "review published"
            );
            ctx.success(PUBLISHED);
        },
        Err(_) => {
            tracing::debug!(movie_id = movie.id, user_id, "duplicate review refused");
            ctx.warning(WARN_DUPLICATE);
        },
    }
    Ok(ctx.redirect(&reviews_href(movie.id)))
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
    let Some(existing) = state.store.find_review(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_UPDATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    };
    let own_rating = state.store.find_rating(movie.id, user_id).await?;
    let errors = FormErrors::default();
    Ok(render_update(ctx, &movie, &existing.content, own_rating.as_ref(), &errors))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(movie): Path<String>,
    mut ctx: Ctx,
    Form(input): Form<ReviewInput>,
) -> AppResult<Response> {
    let Some(user_id) = ctx.user_id() else {
        return Ok(ctx.login_gate());
    };
    let movie = movie_by_id(&state, &movie).await?;
    let Some(existing) = state.store.find_review(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_UPDATE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    };

    let content = match input.validate() {
        Ok(content) => content,
        Err(errors) => {
            let own_rating = state.store.find_rating(movie.id, user_id).await?;
            let raw = input.content.unwrap_or_default();
            return Ok(render_update(ctx, &movie, &raw, own_rating.as_ref(), &errors));
        },
    };

    state.store.update_review(existing, content).await?;
    tracing::info!(movie_id = movie.id, user_id, "review updated");
    ctx.success(UPDATED);
    Ok(ctx.redirect(&reviews_href(movie.id)))
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
    let Some(existing) = state.store.find_review(movie.id, user_id).await? else {
        ctx.warning(WARN_NOTHING_TO_DELETE);
        return Ok(ctx.redirect(&reviews_href(movie.id)));
    };

    state.store.delete_review(existing).await?;
    tracing::info!(movie_id = movie.id, user_id, "review deleted");
    ctx.success(DELETED);
    Ok(ctx.redirect(&reviews_href(movie.id)))
}
