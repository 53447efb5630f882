pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod entities;
pub mod error;
pub mod forms;
pub mod media;
pub mod models;
pub mod routes;
pub mod slug;
pub mod store;
pub mod templates;

use std::{num::NonZeroU32, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sea_orm::DatabaseConnection;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{auth::Passwords, config::Config, media::MediaStore, store::Store};

pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub passwords: Passwords,
    pub media: MediaStore,
    /// Keyed by the lowercased email being tried.
    pub login_limiter: DefaultKeyedRateLimiter<String>,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        let per_minute =
            NonZeroU32::new(config.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            store: Store::new(db),
            passwords: Passwords::new(),
            media: MediaStore::new(config.media_root.clone()),
            login_limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        .route("/", get(routes::catalog::index))
        .route("/genres/{slug}/", get(routes::catalog::movies_by_genre))
        .route("/movies/{movie}/", get(routes::catalog::movie_detail))
        .route("/directors/{slug}/", get(routes::catalog::director_page))
        .route("/actors/{slug}/", get(routes::catalog::actor_page))
        .route("/search/", get(routes::catalog::search))
        .route("/movies/{movie}/rate/", get(routes::ratings::rate_form).post(routes::ratings::rate))
        .route(
            "/movies/{movie}/rate/update/",
            get(routes::ratings::update_form).post(routes::ratings::update),
        )
        .route("/movies/{movie}/rate/delete/", post(routes::ratings::delete))
        .route("/movies/{movie}/reviews/", get(routes::reviews::list))
        .route(
            "/movies/{movie}/review/",
            get(routes::reviews::review_form).post(routes::reviews::review),
        )
        .route(
            "/movies/{movie}/reviews/detail/",
            get(routes::reviews::update_form).post(routes::reviews::update),
        )
        .route("/movies/{movie}/reviews/delete/", post(routes::reviews::delete))
        .route("/register/", get(routes::users::register_form).post(routes::users::register))
        .route("/login/", get(routes::users::login_form).post(routes::users::login))
        .route("/logout", get(routes::users::logout))
        .route("/user/change/", get(routes::users::change_form).post(routes::users::change))
        .route("/become_user/", get(routes::users::become_user))
        .route("/admin/", get(routes::admin::dashboard))
        .route(
            "/admin/directors/new/",
            get(routes::admin::new_director_form).post(routes::admin::create_director),
        )
        .route(
            "/admin/actors/new/",
            get(routes::admin::new_actor_form).post(routes::admin::create_actor),
        )
        .route(
            "/admin/movies/new/",
            get(routes::admin::new_movie_form).post(routes::admin::create_movie),
        )
        .route("/admin/directors/{id}/delete/", post(routes::admin::delete_director))
        .route("/admin/actors/{id}/delete/", post(routes::admin::delete_actor))
        .route("/admin/movies/{id}/delete/", post(routes::admin::delete_movie))
        .nest_service("/media", media)
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
