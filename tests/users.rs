use anyhow::Result;
use axum::http::StatusCode;
use cinedex::entities::user;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[path = "support/mod.rs"]
mod support;

use support::{PASSWORD, TestApp, assert_redirect, flashes};

async fn user_count(app: &TestApp) -> Result<u64> {
    Ok(user::Entity::find().count(app.state.store.db()).await?)
}

fn registration<'a>(username: &'a str, email: &'a str) -> [(&'a str, &'a str); 4] {
    [("username", username), ("email", email), ("password1", PASSWORD), ("password2", PASSWORD)]
}

#[tokio::test]
async fn short_username_is_rejected() -> Result<()> {
    let app = support::spawn().await?;

    let response =
        app.server.post("/register/").form(&registration("abcde", "user@example.com")).await;
    response.assert_status_ok();
    assert!(response.text().contains("Username cannot be shorter than 6 characters."));
    assert_eq!(user_count(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn registration_signs_nobody_in() -> Result<()> {
    let app = support::spawn().await?;

    let response =
        app.server.post("/register/").form(&registration("new_user", "New@Example.com")).await;
    assert_redirect(&response, "/");
    assert_eq!(flashes(&response), ["You were successfully registered."]);

    let stored = app
        .state
        .store
        .find_by(user::Column::Username, "new_user")
        .await?
        .expect("user was stored");
    assert_eq!(stored.email, "new@example.com");
    assert!(!stored.is_staff);
    assert_ne!(stored.password_hash, PASSWORD);

    // Registration does not open a session.
    let home = app.server.get("/").await;
    assert!(home.text().contains("Log in"));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let app = support::spawn().await?;
    app.user("first_user", "taken@example.com").await?;

    let response =
        app.server.post("/register/").form(&registration("second_user", "TAKEN@example.com")).await;
    response.assert_status_ok();
    assert!(response.text().contains("User with this Email already exists."));

    let name_clash =
        app.server.post("/register/").form(&registration("first_user", "other@example.com")).await;
    name_clash.assert_status_ok();
    assert!(name_clash.text().contains("A user with that username already exists."));

    assert_eq!(user_count(&app).await?, 1);
    Ok(())
}

#[tokio::test]
async fn mismatched_passwords_are_rejected() -> Result<()> {
    let app = support::spawn().await?;

    let response = app
        .server
        .post("/register/")
        .form(&[
            ("username", "new_user"),
            ("email", "user@example.com"),
            ("password1", PASSWORD),
            ("password2", "somethingelse99"),
        ])
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("The two password fields didn’t match."));
    assert_eq!(user_count(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn staff_emails_register_as_staff() -> Result<()> {
    let app = support::spawn_with(|config| {
        config.staff_emails = vec!["boss@example.com".to_string()];
    })
    .await?;

    app.server
        .post("/register/")
        .form(&registration("the_boss", "Boss@Example.com"))
        .await
        .assert_status(StatusCode::FOUND);

    let stored = app.state.store.find_by(user::Column::Username, "the_boss").await?;
    assert!(stored.is_some_and(|u| u.is_staff));
    Ok(())
}

#[tokio::test]
async fn login_ignores_email_case() -> Result<()> {
    let app = support::spawn().await?;
    app.user("someone", "someone@example.com").await?;

    let response = app
        .server
        .post("/login/")
        .form(&[("username", "SOMEONE@Example.com"), ("password", PASSWORD)])
        .await;
    assert_redirect(&response, "/");
    assert_eq!(flashes(&response), ["Welcome back."]);

    let home = app.server.get("/").await;
    let html = home.text();
    assert!(html.contains("someone"));
    assert!(html.contains("Log out"));
    Ok(())
}

#[tokio::test]
async fn login_follows_local_next_only() -> Result<()> {
    let app = support::spawn().await?;
    app.user("someone", "someone@example.com").await?;

    let local = app
        .server
        .post("/login/")
        .form(&[
            ("username", "someone@example.com"),
            ("password", PASSWORD),
            ("next", "/user/change/"),
        ])
        .await;
    assert_redirect(&local, "/user/change/");

    let foreign = app
        .server
        .post("/login/")
        .form(&[
            ("username", "someone@example.com"),
            ("password", PASSWORD),
            ("next", "//evil.example.com/"),
        ])
        .await;
    assert_redirect(&foreign, "/");
    Ok(())
}

#[tokio::test]
async fn wrong_password_gets_generic_error() -> Result<()> {
    let app = support::spawn().await?;
    app.user("someone", "someone@example.com").await?;

    for email in ["someone@example.com", "nobody@example.com"] {
        let response = app
            .server
            .post("/login/")
            .form(&[("username", email), ("password", "wrong-password")])
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Please enter a correct email and password."));
    }
    Ok(())
}

#[tokio::test]
async fn repeated_logins_are_throttled() -> Result<()> {
    let app = support::spawn_with(|config| config.login_attempts_per_minute = 2).await?;
    app.user("someone", "someone@example.com").await?;

    let attempt = [("username", "someone@example.com"), ("password", "wrong-password")];
    for _ in 0..2 {
        app.server.post("/login/").form(&attempt).await.assert_status_ok();
    }

    let throttled = app.server.post("/login/").form(&attempt).await;
    throttled.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(throttled.text().contains("Too many login attempts."));

    // Other accounts keep their own budget.
    app.user("another", "another@example.com").await?;
    let other = app
        .server
        .post("/login/")
        .form(&[("username", "another@example.com"), ("password", PASSWORD)])
        .await;
    assert_redirect(&other, "/");
    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> Result<()> {
    let app = support::spawn().await?;
    app.user("someone", "someone@example.com").await?;
    app.login("someone@example.com").await;

    let response = app.server.get("/logout").await;
    assert_redirect(&response, "/");
    assert_eq!(flashes(&response), ["You successfully logged out."]);

    let gated = app.server.get("/user/change/").await;
    assert_redirect(&gated, "/become_user/?next=%2Fuser%2Fchange%2F");
    Ok(())
}

#[tokio::test]
async fn anonymous_change_goes_to_gate() -> Result<()> {
    let app = support::spawn().await?;

    let response = app.server.get("/user/change/").await;
    assert_redirect(&response, "/become_user/?next=%2Fuser%2Fchange%2F");

    let gate = app.server.get("/become_user/?next=%2Fuser%2Fchange%2F").await;
    gate.assert_status_ok();
    assert!(gate.text().contains("/login/?next="));
    Ok(())
}

#[tokio::test]
async fn credentials_change() -> Result<()> {
    let app = support::spawn().await?;
    let me = app.user("someone", "someone@example.com").await?;
    app.user("occupied", "occupied@example.com").await?;
    app.login("someone@example.com").await;

    let clash = app
        .server
        .post("/user/change/")
        .form(&[("username", "occupied"), ("email", "someone@example.com")])
        .await;
    clash.assert_status_ok();
    assert!(clash.text().contains("A user with that username already exists."));

    // Keeping one's own email is not a clash.
    let response = app
        .server
        .post("/user/change/")
        .form(&[("username", "renamed"), ("email", "someone@example.com")])
        .await;
    assert_redirect(&response, "/");
    assert_eq!(flashes(&response), ["You successfully changed your credentials"]);

    let stored = app.state.store.find_by(user::Column::Id, me.id).await?.expect("user exists");
    assert_eq!(stored.username, "renamed");
    assert_eq!(stored.email, "someone@example.com");

    let count = user::Entity::find()
        .filter(user::Column::Username.eq("someone"))
        .count(app.state.store.db())
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn oversized_session_ttl_still_signs_in() -> Result<()> {
    let app = support::spawn_with(|config| config.session_ttl_days = i64::MAX).await?;
    app.user("someone", "someone@example.com").await?;

    let response = app
        .server
        .post("/login/")
        .form(&[("username", "someone@example.com"), ("password", PASSWORD)])
        .await;
    assert_redirect(&response, "/");

    let home = app.server.get("/").await;
    assert!(home.text().contains("Log out"));
    Ok(())
}
