#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use argon2::Params;
use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use cinedex::{
    AppState, app,
    auth::Passwords,
    config::Config,
    ctx::decode_notices,
    db,
    entities::{movie, user},
    models::Country,
    store::{NewMovie, NewPerson, PersonKind},
};
use tempfile::TempDir;

pub const PASSWORD: &str = "34somepassword34";

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    _tempdir: TempDir,
}

pub async fn spawn() -> Result<TestApp> {
    spawn_with(|_| {}).await
}

/// Fresh SQLite file and media root per test.
pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> Result<TestApp> {
    let tempdir = tempfile::tempdir()?;
    let mut config = Config::from_lookup(|_| None)?;
    config.database_url =
        format!("sqlite://{}?mode=rwc", tempdir.path().join("cinedex.db").display());
    config.media_root = tempdir.path().join("media");
    tweak(&mut config);

    let db = db::connect_and_migrate(&config.database_url).await?;
    let mut state = AppState::new(config, db);
    let params = Params::new(8, 1, 1, None).map_err(|err| anyhow!(err.to_string()))?;
    state.passwords = Passwords::with_params(params);
    let state = Arc::new(state);

    let server = TestServer::builder()
        .save_cookies()
        .build(app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp { server, state, _tempdir: tempdir })
}

impl TestApp {
    pub async fn user(&self, username: &str, email: &str) -> Result<user::Model> {
        self.user_with_staff(username, email, false).await
    }

    pub async fn staff(&self, username: &str, email: &str) -> Result<user::Model> {
        self.user_with_staff(username, email, true).await
    }

    async fn user_with_staff(
        &self,
        username: &str,
        email: &str,
        is_staff: bool,
    ) -> Result<user::Model> {
        let hash = self.state.passwords.hash(PASSWORD)?;
        self.state
            .store
            .create_user(username, email, hash, is_staff)
            .await?
            .map_err(|_| anyhow!("user {username} already exists"))
    }

    pub async fn login(&self, email: &str) {
        let response = self
            .server
            .post("/login/")
            .form(&[("username", email), ("password", PASSWORD)])
            .await;
        response.assert_status(StatusCode::FOUND);
        // Render once so the welcome notice does not leak into the next redirect.
        self.server.get("/").await.assert_status_ok();
    }

    pub async fn director(&self, name: &str) -> Result<i32> {
        self.person(PersonKind::Director, name).await
    }

    pub async fn actor(&self, name: &str) -> Result<i32> {
        self.person(PersonKind::Actor, name).await
    }

    async fn person(&self, kind: PersonKind, name: &str) -> Result<i32> {
        let photo = format!("movies/images/{}.png", cinedex::slug::slugify(name));
        self.state
            .store
            .create_person(kind, NewPerson { name: name.to_string(), photo })
            .await?
            .map_err(|_| anyhow!("{name} already exists"))
    }

    pub async fn movie(
        &self,
        title: &str,
        director_id: i32,
        actor_ids: Vec<i32>,
        genres: &[&str],
    ) -> Result<movie::Model> {
        let id = self
            .state
            .store
            .create_movie(NewMovie {
                title: title.to_string(),
                synopsis: format!("{title} synopsis"),
                release_date: jiff::civil::date(1999, 10, 15),
                country: Country::UnitedStates,
                poster: "movies/images/poster.png".to_string(),
                director_id,
                actor_ids,
                genres: genres.iter().map(|g| g.to_string()).collect(),
            })
            .await?
            .map_err(|_| anyhow!("{title} already exists"))?;
        self.state
            .store
            .find_by(movie::Column::Id, id)
            .await?
            .ok_or_else(|| anyhow!("movie {id} vanished"))
    }

    /// The classic: "Fight Club" by David Fincher.
    pub async fn fight_club(&self) -> Result<movie::Model> {
        let director = self.director("David Fincher").await?;
        let actor = self.actor("Brad Pitt").await?;
        self.movie("Fight Club", director, vec![actor], &["Drama", "Thriller"]).await
    }

    pub async fn rating_count(&self, movie_id: i32) -> Result<i64> {
        let stats = self.state.store.rating_stats(&[movie_id]).await?;
        Ok(stats.get(&movie_id).map(|s| s.count).unwrap_or_default())
    }
}

/// Notice texts carried by a redirect.
pub fn flashes(response: &TestResponse) -> Vec<String> {
    response
        .maybe_cookie("messages")
        // The cookie jar percent-encodes values on the wire; undo that layer
        // as the app's own `CookieJar` extractor does.
        .map(|cookie| {
            let raw = urlencoding::decode(cookie.value())
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| cookie.value().to_string());
            decode_notices(&raw)
        })
        .unwrap_or_default()
        .into_iter()
        .map(|notice| notice.text)
        .collect()
}

/// A small PNG that decodes cleanly.
pub fn png_bytes() -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::RgbImage::from_pixel(2, 2, image::Rgb([20, 20, 20]))
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn location(response: &TestResponse) -> String {
    response.header("location").to_str().unwrap_or_default().to_string()
}

pub fn assert_redirect(response: &TestResponse, to: &str) {
    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(response), to);
}
