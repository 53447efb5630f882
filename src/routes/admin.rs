//! Staff-only catalog maintenance: directors, actors and movies.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use super::parse_id;
use crate::{
    AppState,
    ctx::Ctx,
    entities::director,
    error::{AppError, AppResult},
    forms::{FormErrors, MovieInput, validate_name},
    media::{MultipartForm, validate_image},
    store::{NewMovie, NewPerson, PersonKind},
    templates::admin as pages,
};

const ADMIN_HOME: &str = "/admin/";

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    q: Option<String>,
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
    ctx: Ctx,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    let q = query.q.unwrap_or_default();
    let filter = Some(q.trim()).filter(|s| !s.is_empty());

    let directors = state.store.list_directors(filter).await?;
    let actors = state.store.list_actors(filter).await?;
    let movies = state.store.list_movie_rows(filter).await?;
    Ok(ctx.render("Administration", pages::dashboard(&q, &directors, &actors, &movies)))
}

pub async fn new_director_form(ctx: Ctx) -> Response {
    person_form(ctx, PersonKind::Director)
}

pub async fn new_actor_form(ctx: Ctx) -> Response {
    person_form(ctx, PersonKind::Actor)
}

fn person_form(ctx: Ctx, kind: PersonKind) -> Response {
    if !ctx.is_staff() {
        return ctx.login_gate();
    }
    let title = format!("Add {}", kind.label().to_lowercase());
    ctx.render(&title, pages::person_form(kind, "", &FormErrors::default()))
}

pub async fn create_director(
    State(state): State<Arc<AppState>>,
    ctx: Ctx,
    multipart: Multipart,
) -> AppResult<Response> {
    create_person(&state, ctx, PersonKind::Director, multipart).await
}

pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    ctx: Ctx,
    multipart: Multipart,
) -> AppResult<Response> {
    create_person(&state, ctx, PersonKind::Actor, multipart).await
}

async fn create_person(
    state: &AppState,
    mut ctx: Ctx,
    kind: PersonKind,
    multipart: Multipart,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    let title = format!("Add {}", kind.label().to_lowercase());

    let mut form = MultipartForm::read(multipart).await?;
    let raw_name = form.text("name");
    let mut errors = FormErrors::default();
    let name = validate_name("name", &raw_name, &mut errors);
    let image = validate_image("photo", form.take_file("photo"), &mut errors);

    let Some((image_kind, bytes)) = image.filter(|_| errors.is_empty()) else {
        return Ok(ctx.render(&title, pages::person_form(kind, &raw_name, &errors)));
    };

    let photo = state.media.save_image(image_kind, &bytes).await?;
    let created = state
        .store
        .create_person(kind, NewPerson { name: name.name.clone(), photo: photo.clone() })
        .await?;

    match created {
        Ok(id) => {
            tracing::info!(kind = kind.label(), id, "person added");
            let noun = kind.label().to_lowercase();
            ctx.success(format!("The {noun} “{}” was added successfully.", name.name));
            Ok(ctx.redirect(ADMIN_HOME))
        },
        Err(_) => {
            state.media.remove(&photo).await;
            let errors = FormErrors::single(
                "name",
                format!("{} with this Name already exists.", kind.label()),
            );
            Ok(ctx.render(&title, pages::person_form(kind, &raw_name, &errors)))
        },
    }
}

pub async fn new_movie_form(State(state): State<Arc<AppState>>, ctx: Ctx) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    render_movie_form(&state, ctx, &MovieInput::default(), &FormErrors::default()).await
}

async fn render_movie_form(
    state: &AppState,
    ctx: Ctx,
    input: &MovieInput,
    errors: &FormErrors,
) -> AppResult<Response> {
    let directors = state.store.list_directors(None).await?;
    let actors = state.store.list_actors(None).await?;
    Ok(ctx.render("Add movie", pages::movie_form(input, &directors, &actors, errors)))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    mut ctx: Ctx,
    multipart: Multipart,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }

    let mut form = MultipartForm::read(multipart).await?;
    let input = MovieInput {
        title: form.text("title"),
        synopsis: form.text("synopsis"),
        release_date: form.text("release_date"),
        country: form.text("country"),
        director: form.text("director"),
        actors: form.all("actors"),
        genres: form.text("genres"),
    };

    let mut errors = FormErrors::default();
    let draft = input.validate(&mut errors);
    let image = validate_image("poster", form.take_file("poster"), &mut errors);

    if let Some(draft) = &draft {
        if state.store.find_by(director::Column::Id, draft.director_id).await?.is_none() {
            errors.add(
                "director",
                "Select a valid choice. That choice is not one of the available choices.",
            );
        }
        let known: HashSet<i32> =
            state.store.list_actors(None).await?.into_iter().map(|a| a.id).collect();
        for id in draft.actor_ids.iter().filter(|id| !known.contains(*id)) {
            errors.add(
                "actors",
                format!("Select a valid choice. {id} is not one of the available choices."),
            );
        }
    }

    let (Some(draft), Some((image_kind, bytes))) = (draft, image) else {
        return render_movie_form(&state, ctx, &input, &errors).await;
    };
    if !errors.is_empty() {
        return render_movie_form(&state, ctx, &input, &errors).await;
    }

    let poster = state.media.save_image(image_kind, &bytes).await?;
    let title = draft.title.name.clone();
    let created = state
        .store
        .create_movie(NewMovie {
            title: draft.title.name,
            synopsis: draft.synopsis,
            release_date: draft.release_date,
            country: draft.country,
            poster: poster.clone(),
            director_id: draft.director_id,
            actor_ids: draft.actor_ids,
            genres: draft.genres.into_iter().map(|g| g.name).collect(),
        })
        .await?;

    match created {
        Ok(_) => {
            ctx.success(format!("The movie “{title}” was added successfully."));
            Ok(ctx.redirect(ADMIN_HOME))
        },
        Err(_) => {
            state.media.remove(&poster).await;
            let errors = FormErrors::single("title", "Movie with this Title already exists.");
            render_movie_form(&state, ctx, &input, &errors).await
        },
    }
}

pub async fn delete_director(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    let id = parse_id(&id)?;
    let existing =
        state.store.find_by(director::Column::Id, id).await?.ok_or(AppError::NotFound)?;

    match state.store.delete_director(id).await? {
        Ok(Some(removed)) => {
            state.media.remove(&removed.photo).await;
            tracing::info!(director_id = id, "director deleted");
            ctx.success(format!("The director “{}” was deleted successfully.", removed.name));
        },
        Ok(None) => return Err(AppError::NotFound),
        Err(_) => {
            tracing::debug!(director_id = id, "protected director kept");
            ctx.warning(format!(
                "Cannot delete director {} because movies reference it.",
                existing.name
            ));
        },
    }
    Ok(ctx.redirect(ADMIN_HOME))
}

pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    let id = parse_id(&id)?;
    let removed = state.store.delete_actor(id).await?.ok_or(AppError::NotFound)?;
    state.media.remove(&removed.photo).await;
    tracing::info!(actor_id = id, "actor deleted");
    ctx.success(format!("The actor “{}” was deleted successfully.", removed.name));
    Ok(ctx.redirect(ADMIN_HOME))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut ctx: Ctx,
) -> AppResult<Response> {
    if !ctx.is_staff() {
        return Ok(ctx.login_gate());
    }
    let id = parse_id(&id)?;
    let removed = state.store.delete_movie(id).await?.ok_or(AppError::NotFound)?;
    state.media.remove(&removed.poster).await;
    tracing::info!(movie_id = id, "movie deleted");
    ctx.success(format!("The movie “{}” was deleted successfully.", removed.title));
    Ok(ctx.redirect(ADMIN_HOME))
}
