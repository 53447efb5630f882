use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use super::{Store, now_sec};
use crate::{
    config::clamp_ttl_days,
    entities::{session, user},
    error::AppResult,
};

impl Store {
    /// Returns the opaque token to hand to the client.
    pub async fn create_session(&self, user_id: i32, ttl_days: i64) -> AppResult<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = now_sec();
        session::Entity::insert(session::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id),
            created_at: Set(now),
            expires_at: Set(now + clamp_ttl_days(ttl_days) * 86_400),
        })
        .exec_without_returning(&self.db)
        .await?;
        Ok(token)
    }

    /// Expired sessions resolve to nobody.
    pub async fn session_user(&self, token: &str) -> AppResult<Option<user::Model>> {
        let found = session::Entity::find_by_id(token.to_string())
            .filter(session::Column::ExpiresAt.gt(now_sec()))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(_, user)| user))
    }

    pub async fn delete_session(&self, token: &str) -> AppResult<()> {
        session::Entity::delete_by_id(token.to_string()).exec(&self.db).await?;
        Ok(())
    }

    pub async fn purge_expired_sessions(&self) -> AppResult<u64> {
        let res = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now_sec()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}
