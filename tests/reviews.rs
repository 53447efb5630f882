use anyhow::{Result, anyhow};
use axum::http::StatusCode;
use cinedex::{entities::review, store::Conflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};

#[path = "support/mod.rs"]
mod support;

use support::{TestApp, assert_redirect, flashes};

const LONG_ENOUGH: &str = "A film about soap, and about men who hit each other.";

async fn review_count(app: &TestApp, movie_id: i32) -> Result<u64> {
    Ok(review::Entity::find()
        .filter(review::Column::MovieId.eq(movie_id))
        .count(app.state.store.db())
        .await?)
}

#[tokio::test]
async fn publish_then_list() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    let user = app.user("user_one", "user1@example.com").await?;
    app.state
        .store
        .create_rating(movie.id, user.id, 8)
        .await?
        .map_err(|_| anyhow!("duplicate rating"))?;
    app.login("user1@example.com").await;

    let list_path = format!("/movies/{}/reviews/", movie.id);
    let response = app
        .server
        .post(&format!("/movies/{}/review/", movie.id))
        .form(&[("content", LONG_ENOUGH)])
        .await;
    assert_redirect(&response, &list_path);
    assert_eq!(flashes(&response), ["You successfully published your review on the movie"]);

    let page = app.server.get(&list_path).await;
    page.assert_status_ok();
    let html = page.text();
    assert!(html.contains(LONG_ENOUGH));
    assert!(html.contains("user_one"));
    assert!(html.contains("Rated 8/10"));
    assert!(html.contains("Edit your review"));
    assert_eq!(review_count(&app, movie.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn short_review_is_rejected() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    app.user("user_one", "user1@example.com").await?;
    app.login("user1@example.com").await;

    let path = format!("/movies/{}/review/", movie.id);
    let short = app.server.post(&path).form(&[("content", "Too short")]).await;
    short.assert_status_ok();
    assert!(short.text().contains("Your review is too short."));

    let empty = app.server.post(&path).form(&[("content", "")]).await;
    empty.assert_status_ok();
    assert!(empty.text().contains("This field is required."));

    // Exactly eleven characters, padding included, is enough.
    let boundary = app.server.post(&path).form(&[("content", "  ten chars")]).await;
    boundary.assert_status(StatusCode::FOUND);
    assert_eq!(review_count(&app, movie.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn second_review_is_refused() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    app.user("user_one", "user1@example.com").await?;
    app.login("user1@example.com").await;

    let path = format!("/movies/{}/review/", movie.id);
    app.server.post(&path).form(&[("content", LONG_ENOUGH)]).await.assert_status(StatusCode::FOUND);

    let again = app.server.post(&path).form(&[("content", "Another long enough take")]).await;
    assert_redirect(&again, &format!("/movies/{}/reviews/", movie.id));
    assert!(flashes(&again).contains(&"You can have only one review per movie".to_string()));
    assert_eq!(review_count(&app, movie.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn anonymous_review_redirects_to_list() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;

    let response = app.server.get(&format!("/movies/{}/review/", movie.id)).await;
    assert_redirect(&response, &format!("/movies/{}/reviews/", movie.id));
    assert_eq!(flashes(&response), ["Please, authenticate to publish your review on the movie"]);
    assert_eq!(review_count(&app, movie.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn update_keeps_published_and_shows_own_rating() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    let user = app.user("user_one", "user1@example.com").await?;
    let original = app
        .state
        .store
        .create_review(movie.id, user.id, LONG_ENOUGH.to_string())
        .await?
        .map_err(|_| anyhow!("duplicate review"))?;
    app.state
        .store
        .create_rating(movie.id, user.id, 7)
        .await?
        .map_err(|_| anyhow!("duplicate rating"))?;
    app.login("user1@example.com").await;

    let detail = format!("/movies/{}/reviews/detail/", movie.id);
    let form = app.server.get(&detail).await;
    form.assert_status_ok();
    let html = form.text();
    assert!(html.contains(LONG_ENOUGH));
    assert!(html.contains("Your rating: 7/10"));

    let rejected = app.server.post(&detail).form(&[("content", "nope")]).await;
    rejected.assert_status_ok();
    assert!(rejected.text().contains("Your review is too short."));

    let updated = app.server.post(&detail).form(&[("content", "Second thoughts, still great")]).await;
    assert_redirect(&updated, &format!("/movies/{}/reviews/", movie.id));
    assert!(
        flashes(&updated).contains(&"You successfully updated your review of the movie.".to_string())
    );

    let stored = app
        .state
        .store
        .find_review(movie.id, user.id)
        .await?
        .ok_or_else(|| anyhow!("review vanished"))?;
    assert_eq!(stored.content, "Second thoughts, still great");
    assert_eq!(stored.published, original.published);
    assert!(stored.updated >= original.updated);
    Ok(())
}

#[tokio::test]
async fn update_and_delete_without_review_warn() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    app.user("user_one", "user1@example.com").await?;
    app.login("user1@example.com").await;

    let list = format!("/movies/{}/reviews/", movie.id);
    let update = app.server.get(&format!("/movies/{}/reviews/detail/", movie.id)).await;
    assert_redirect(&update, &list);
    assert_eq!(flashes(&update), ["You have not reviewed the movie."]);

    let delete = app.server.post(&format!("/movies/{}/reviews/delete/", movie.id)).await;
    assert_redirect(&delete, &list);
    assert!(flashes(&delete).contains(&"You have no review of the movie to delete.".to_string()));
    Ok(())
}

#[tokio::test]
async fn owner_deletes_review() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    let user = app.user("user_one", "user1@example.com").await?;
    app.state
        .store
        .create_review(movie.id, user.id, LONG_ENOUGH.to_string())
        .await?
        .map_err(|_| anyhow!("duplicate review"))?;
    app.login("user1@example.com").await;

    let delete = app.server.post(&format!("/movies/{}/reviews/delete/", movie.id)).await;
    assert_redirect(&delete, &format!("/movies/{}/reviews/", movie.id));
    assert_eq!(flashes(&delete), ["You successfully deleted your review of the movie."]);
    assert_eq!(review_count(&app, movie.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn reviews_are_listed_newest_first() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    let first = app.user("early_bird", "early@example.com").await?;
    let second = app.user("late_comer", "late@example.com").await?;
    for (user, text) in [(&first, "The first review ever"), (&second, "The second review here")] {
        app.state
            .store
            .create_review(movie.id, user.id, text.to_string())
            .await?
            .map_err(|_| anyhow!("duplicate review"))?;
    }

    let entries = app.state.store.reviews_for_movie(movie.id).await?;
    let authors: Vec<&str> = entries.iter().map(|e| e.author.username.as_str()).collect();
    assert_eq!(authors, ["late_comer", "early_bird"]);
    assert!(entries.iter().all(|e| e.rating.is_none()));

    let page = app.server.get(&format!("/movies/{}/reviews/", movie.id)).await;
    let html = page.text();
    let late = html.find("The second review here").unwrap_or(usize::MAX);
    let early = html.find("The first review ever").unwrap_or(usize::MAX);
    assert!(late < early);
    Ok(())
}

#[tokio::test]
async fn reviews_of_missing_movie_are_not_found() -> Result<()> {
    let app = support::spawn().await?;
    app.server.get("/movies/41/reviews/").await.assert_status(StatusCode::NOT_FOUND);
    app.server.get("/movies/x/reviews/").await.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unique_index_refuses_a_second_review() -> Result<()> {
    let app = support::spawn().await?;
    let movie = app.fight_club().await?;
    let user = app.user("user_one", "user1@example.com").await?;

    let row = || review::ActiveModel {
        id: Default::default(),
        movie_id: Set(movie.id),
        owner_id: Set(user.id),
        content: Set(LONG_ENOUGH.to_string()),
        published: Set(1_700_000_000),
        updated: Set(1_700_000_000),
    };
    row().insert(app.state.store.db()).await?;
    let err = row().insert(app.state.store.db()).await.expect_err("second review was stored");
    assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));

    let again = app.state.store.insert_review(movie.id, user.id, LONG_ENOUGH.to_string()).await?;
    assert_eq!(again.map(|r| r.id), Err(Conflict));
    assert_eq!(review_count(&app, movie.id).await?, 1);
    Ok(())
}
