use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    AppState,
    ctx::Ctx,
    entities::user,
    error::AppResult,
    forms::{
        ChangeUserInput, EMAIL_TAKEN, FormErrors, INVALID_LOGIN, LoginInput, RegisterInput,
        USERNAME_TAKEN, safe_next,
    },
    store::Taken,
    templates::users as pages,
};

const REGISTERED: &str = "You were successfully registered.";
const WELCOME_BACK: &str = "Welcome back.";
const LOGGED_OUT: &str = "You successfully logged out.";
const CREDENTIALS_CHANGED: &str = "You successfully changed your credentials";
const TOO_MANY_ATTEMPTS: &str = "Too many login attempts. Please try again later.";

fn add_taken(errors: &mut FormErrors, taken: Taken) {
    if taken.username {
        errors.add("username", USERNAME_TAKEN);
    }
    if taken.email {
        errors.add("email", EMAIL_TAKEN);
    }
}

pub async fn register_form(ctx: Ctx) -> Response {
    ctx.render("Register", pages::register("", "", &FormErrors::default()))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    mut ctx: Ctx,
    Form(input): Form<RegisterInput>,
) -> AppResult<Response> {
    let registration = match input.validate() {
        Ok(registration) => registration,
        Err(errors) => {
            let body = pages::register(&input.username, &input.email, &errors);
            return Ok(ctx.render("Register", body));
        },
    };

    let taken = state.store.taken(&registration.username, &registration.email, None).await?;
    if taken.any() {
        let mut errors = FormErrors::default();
        add_taken(&mut errors, taken);
        let body = pages::register(&input.username, &input.email, &errors);
        return Ok(ctx.render("Register", body));
    }

    let passwords = state.passwords.clone();
    let password = registration.password.clone();
    let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let is_staff = state.config.is_staff_email(&registration.email);
    let created = state
        .store
        .create_user(&registration.username, &registration.email, hash, is_staff)
        .await?;
    match created {
        Ok(_) => {
            ctx.success(REGISTERED);
            Ok(ctx.redirect("/"))
        },
        Err(_) => {
            // Lost a race with another registration for the same name or email.
            let mut errors = FormErrors::default();
            add_taken(
                &mut errors,
                state.store.taken(&registration.username, &registration.email, None).await?,
            );
            if errors.is_empty() {
                errors.add(FormErrors::NON_FIELD, USERNAME_TAKEN);
            }
            let body = pages::register(&input.username, &input.email, &errors);
            Ok(ctx.render("Register", body))
        },
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    next: Option<String>,
}

pub async fn login_form(Query(query): Query<NextQuery>, ctx: Ctx) -> Response {
    let next = safe_next(query.next.as_deref());
    ctx.render("Log in", pages::login("", next.as_deref(), &FormErrors::default()))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    mut ctx: Ctx,
    Form(input): Form<LoginInput>,
) -> AppResult<Response> {
    let next = safe_next(input.next.as_deref());

    let (email, password) = match input.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let body = pages::login(&input.username, next.as_deref(), &errors);
            return Ok(ctx.render("Log in", body));
        },
    };

    if state.login_limiter.check_key(&email).is_err() {
        tracing::warn!(email = %email, "login throttled");
        let errors = FormErrors::single(FormErrors::NON_FIELD, TOO_MANY_ATTEMPTS);
        let body = pages::login(&input.username, next.as_deref(), &errors);
        return Ok(ctx.render_with_status(StatusCode::TOO_MANY_REQUESTS, "Log in", body));
    }

    let user = state.store.find_by(user::Column::Email, email.as_str()).await?;
    let verified = match &user {
        Some(found) => {
            let passwords = state.passwords.clone();
            let hash = found.password_hash.clone();
            tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
                .await
                .map_err(anyhow::Error::from)?
        },
        None => false,
    };

    let Some(account) = user.filter(|_| verified) else {
        tracing::debug!(email = %email, "login failed");
        let errors = FormErrors::single(FormErrors::NON_FIELD, INVALID_LOGIN);
        let body = pages::login(&input.username, next.as_deref(), &errors);
        return Ok(ctx.render("Log in", body));
    };

    let token = state.store.create_session(account.id, state.config.session_ttl_days).await?;
    tracing::info!(user_id = account.id, "logged in");
    ctx.start_session(token);
    ctx.success(WELCOME_BACK);
    Ok(ctx.redirect(next.as_deref().unwrap_or("/")))
}

pub async fn logout(State(state): State<Arc<AppState>>, mut ctx: Ctx) -> AppResult<Response> {
    if let Some(token) = ctx.session_token() {
        state.store.delete_session(&token).await?;
    }
    if let Some(user_id) = ctx.user_id() {
        tracing::info!(user_id, "logged out");
    }
    ctx.end_session();
    ctx.success(LOGGED_OUT);
    Ok(ctx.redirect("/"))
}

pub async fn change_form(ctx: Ctx) -> Response {
    let Some(user) = ctx.user.clone() else {
        return ctx.login_gate();
    };
    ctx.render(
        "Change credentials",
        pages::change_user(&user.username, &user.email, &FormErrors::default()),
    )
}

pub async fn change(
    State(state): State<Arc<AppState>>,
    mut ctx: Ctx,
    Form(input): Form<ChangeUserInput>,
) -> AppResult<Response> {
    let Some(user) = ctx.user.clone() else {
        return Ok(ctx.login_gate());
    };

    let (username, email) = match input.validate() {
        Ok(values) => values,
        Err(errors) => {
            let body = pages::change_user(&input.username, &input.email, &errors);
            return Ok(ctx.render("Change credentials", body));
        },
    };

    let taken = state.store.taken(&username, &email, Some(user.id)).await?;
    if taken.any() {
        let mut errors = FormErrors::default();
        add_taken(&mut errors, taken);
        let body = pages::change_user(&input.username, &input.email, &errors);
        return Ok(ctx.render("Change credentials", body));
    }

    let user_id = user.id;
    match state.store.update_user(user, &username, &email).await? {
        Ok(updated) => {
            tracing::info!(user_id = updated.id, "credentials changed");
            ctx.success(CREDENTIALS_CHANGED);
            Ok(ctx.redirect("/"))
        },
        Err(_) => {
            let mut errors = FormErrors::default();
            add_taken(&mut errors, state.store.taken(&username, &email, Some(user_id)).await?);
            if errors.is_empty() {
                errors.add(FormErrors::NON_FIELD, USERNAME_TAKEN);
            }
            let body = pages::change_user(&input.username, &input.email, &errors);
            Ok(ctx.render("Change credentials", body))
        },
    }
}

pub async fn become_user(Query(query): Query<NextQuery>, ctx: Ctx) -> Response {
    let next = safe_next(query.next.as_deref());
    ctx.render("Please log in", pages::become_user(next.as_deref()))
}
