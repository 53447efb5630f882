//! Repository over the catalog database.
//!
//! Lookups return `AppResult<Option<_>>`. Writes that can trip a uniqueness or
//! protection rule return an inner `Result` so handlers can turn the outcome
//! into a notice instead of an error page.

mod catalog;
mod ratings;
mod reviews;
mod sessions;
mod users;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr, Value,
};

pub use catalog::{NewMovie, NewPerson, PersonKind};
pub use users::Taken;

use crate::error::AppResult;

/// A write was refused by a uniqueness constraint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Conflict;

/// A delete was refused because other rows still reference the record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Protected;

#[derive(Clone, Debug)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// First row of the column's entity whose `column` equals `value`.
    ///
    /// ```ignore
    /// let movie = store.find_by(movie::Column::Slug, "fight-club").await?;
    /// ```
    pub async fn find_by<C, V>(
        &self,
        column: C,
        value: V,
    ) -> AppResult<Option<<C::EntityName as EntityTrait>::Model>>
    where
        C: ColumnTrait,
        C::EntityName: EntityTrait,
        V: Into<Value>,
    {
        Ok(<C::EntityName as EntityTrait>::find().filter(column.eq(value)).one(&self.db).await?)
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
