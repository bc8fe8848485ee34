use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Result, ResultExt, SimpleObject};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::decode_datetime;
use crate::error::ApiError;
use crate::graphql::loaders::RelationLoader;
use crate::orm::{ColumnDef, DatabaseEntity, DatabaseSchema, FromSqlRow, HasKey};

use super::link::Link;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,

    #[graphql(skip)]
    pub password_hash: String,

    #[graphql(skip)]
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl User {
    /// Links posted by this user
    async fn links(&self, ctx: &Context<'_>) -> Result<Vec<Link>> {
        let links = ctx
            .data_unchecked::<DataLoader<RelationLoader<Link>>>()
            .load_one(self.id)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(links.unwrap_or_default())
    }
}

impl DatabaseEntity for User {
    const TABLE_NAME: &'static str = "users";

    fn column_names() -> &'static [&'static str] {
        &["id", "name", "email", "password_hash", "created_at"]
    }
}

impl DatabaseSchema for User {
    fn columns() -> &'static [ColumnDef] {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::primary_key("id"),
            ColumnDef::required("name", "TEXT"),
            ColumnDef {
                unique: true,
                ..ColumnDef::required("email", "TEXT")
            },
            ColumnDef::required("password_hash", "TEXT"),
            ColumnDef::required("created_at", "TEXT"),
        ];
        COLUMNS
    }
}

impl FromSqlRow for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: decode_datetime(row, "created_at")?,
        })
    }
}

impl HasKey for User {
    fn key(&self, column: &str) -> Option<i32> {
        match column {
            "id" => Some(self.id),
            _ => None,
        }
    }
}
