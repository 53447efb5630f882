use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};

use super::{Conflict, Store, is_unique_violation, now_sec};
use crate::{
    entities::{rating, review, user},
    error::AppResult,
    models::ReviewEntry,
};

impl Store {
    pub async fn find_review(
        &self,
        movie_id: i32,
        owner_id: i32,
    ) -> AppResult<Option<review::Model>> {
        Ok(review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?)
    }

    pub async fn create_review(
        &self,
        movie_id: i32,
        owner_id: i32,
        content: String,
    ) -> AppResult<Result<review::Model, Conflict>> {
        if self.find_review(movie_id, owner_id).await?.is_some() {
            return Ok(Err(Conflict));
        }
        self.insert_review(movie_id, owner_id, content).await
    }

    /// Insert without the up-front check; a duplicate (movie, owner) is
    /// turned back by the unique index as `Conflict`.
    pub async fn insert_review(
        &self,
        movie_id: i32,
        owner_id: i32,
        content: String,
    ) -> AppResult<Result<review::Model, Conflict>> {
        let now = now_sec();
        let row = review::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            owner_id: Set(owner_id),
            content: Set(content),
            published: Set(now),
            updated: Set(now),
        };
        match row.insert(&self.db).await {
            Ok(model) => Ok(Ok(model)),
            Err(err) if is_unique_violation(&err) => Ok(Err(Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// `published` is never touched; `updated` moves on every change.
    pub async fn update_review(
        &self,
        existing: review::Model,
        content: String,
    ) -> AppResult<review::Model> {
        let mut row: review::ActiveModel = existing.into();
        row.content = Set(content);
        row.updated = Set(now_sec());
        Ok(row.update(&self.db).await?)
    }

    pub async fn delete_review(&self, existing: review::Model) -> AppResult<()> {
        existing.delete(&self.db).await?;
        Ok(())
    }

    /// Newest first, each paired with its author's rating of the same movie.
    pub async fn reviews_for_movie(&self, movie_id: i32) -> AppResult<Vec<ReviewEntry>> {
        let rows = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::Published)
            .order_by_desc(review::Column::Id)
            .all(&self.db)
            .await?;

        let owner_ids: Vec<i32> = rows.iter().map(|(r, _)| r.owner_id).collect();
        let mut ratings: HashMap<i32, rating::Model> = rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie_id))
            .filter(rating::Column::OwnerId.is_in(owner_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.owner_id, r))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(review, author)| {
                let author = author?;
                let rating = ratings.remove(&review.owner_id);
                Some(ReviewEntry { review, author, rating })
            })
            .collect())
    }
}
