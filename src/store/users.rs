use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, sea_query::Expr,
};

use super::{Conflict, Store, is_unique_violation, now_sec};
use crate::{entities::user, error::AppResult};

/// Which unique account fields are already held by someone else.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Taken {
    pub username: bool,
    pub email: bool,
}

impl Taken {
    pub fn any(self) -> bool {
        self.username || self.email
    }
}

impl Store {
    /// `except` skips the caller's own record on profile changes.
    pub async fn taken(
        &self,
        username: &str,
        email: &str,
        except: Option<i32>,
    ) -> AppResult<Taken> {
        let mut by_username = user::Entity::find().filter(user::Column::Username.eq(username));
        let mut by_email =
            user::Entity::find().filter(user::Column::Email.eq(email.to_lowercase()));
        if let Some(id) = except {
            by_username = by_username.filter(user::Column::Id.ne(id));
            by_email = by_email.filter(user::Column::Id.ne(id));
        }
        Ok(Taken {
            username: by_username.count(&self.db).await? > 0,
            email: by_email.count(&self.db).await? > 0,
        })
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
        is_staff: bool,
    ) -> AppResult<Result<user::Model, Conflict>> {
        let row = user::ActiveModel {
            id: Default::default(),
            username: Set(username.to_string()),
            email: Set(email.to_lowercase()),
            password_hash: Set(password_hash),
            is_staff: Set(is_staff),
            date_joined: Set(now_sec()),
        };
        match row.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(user_id = model.id, "user registered");
                Ok(Ok(model))
            },
            Err(err) if is_unique_violation(&err) => Ok(Err(Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_user(
        &self,
        existing: user::Model,
        username: &str,
        email: &str,
    ) -> AppResult<Result<user::Model, Conflict>> {
        let mut row: user::ActiveModel = existing.into();
        row.username = Set(username.to_string());
        row.email = Set(email.to_lowercase());
        match row.update(&self.db).await {
            Ok(model) => Ok(Ok(model)),
            Err(err) if is_unique_violation(&err) => Ok(Err(Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns how many accounts were newly promoted.
    pub async fn promote_staff(&self, emails: &[String]) -> AppResult<u64> {
        if emails.is_empty() {
            return Ok(0);
        }
        let res = user::Entity::update_many()
            .col_expr(user::Column::IsStaff, Expr::value(true))
            .filter(user::Column::Email.is_in(emails.iter().map(|e| e.to_lowercase())))
            .filter(user::Column::IsStaff.eq(false))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}
