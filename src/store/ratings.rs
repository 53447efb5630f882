use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};

use super::{Conflict, Store, is_unique_violation};
use crate::{entities::rating, error::AppResult};

impl Store {
    pub async fn find_rating(
        &self,
        movie_id: i32,
        owner_id: i32,
    ) -> AppResult<Option<rating::Model>> {
        Ok(rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie_id))
            .filter(rating::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?)
    }

    /// Checks for an existing rating first, then inserts.
    pub async fn create_rating(
        &self,
        movie_id: i32,
        owner_id: i32,
        value: i16,
    ) -> AppResult<Result<rating::Model, Conflict>> {
        if self.find_rating(movie_id, owner_id).await?.is_some() {
            return Ok(Err(Conflict));
        }
        self.insert_rating(movie_id, owner_id, value).await
    }

    /// Plain insert. The unique index on (movie, owner) is the final word; a
    /// lost race comes back as `Conflict` just like the up-front check.
    pub async fn insert_rating(
        &self,
        movie_id: i32,
        owner_id: i32,
        value: i16,
    ) -> AppResult<Result<rating::Model, Conflict>> {
        let row = rating::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            owner_id: Set(owner_id),
            rating: Set(value),
        };
        match row.insert(&self.db).await {
            Ok(model) => Ok(Ok(model)),
            Err(err) if is_unique_violation(&err) => Ok(Err(Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_rating(
        &self,
        existing: rating::Model,
        value: i16,
    ) -> AppResult<rating::Model> {
        let mut row: rating::ActiveModel = existing.into();
        row.rating = Set(value);
        Ok(row.update(&self.db).await?)
    }

    pub async fn delete_rating(&self, existing: rating::Model) -> AppResult<()> {
        existing.delete(&self.db).await?;
        Ok(())
    }
}
