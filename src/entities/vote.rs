use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Result, ResultExt, SimpleObject};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::error::ApiError;
use crate::graphql::loaders::EntityByIdLoader;
use crate::orm::{ColumnDef, DatabaseEntity, DatabaseSchema, FromSqlRow, HasKey};

use super::link::Link;
use super::user::User;

/// One user's vote on one link.
#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Vote {
    pub id: i32,

    #[graphql(skip)]
    pub link_id: i32,

    #[graphql(skip)]
    pub user_id: i32,
}

#[ComplexObject]
impl Vote {
    async fn link(&self, ctx: &Context<'_>) -> Result<Link> {
        ctx.data_unchecked::<DataLoader<EntityByIdLoader<Link>>>()
            .load_one(self.link_id)
            .await
            .map_err(ApiError::from)
            .and_then(|link| link.ok_or(ApiError::Database(sqlx::Error::RowNotFound)))
            .extend()
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        ctx.data_unchecked::<DataLoader<EntityByIdLoader<User>>>()
            .load_one(self.user_id)
            .await
            .map_err(ApiError::from)
            .and_then(|user| user.ok_or(ApiError::Database(sqlx::Error::RowNotFound)))
            .extend()
    }
}

impl DatabaseEntity for Vote {
    const TABLE_NAME: &'static str = "votes";

    fn column_names() -> &'static [&'static str] {
        &["id", "link_id", "user_id"]
    }
}

impl DatabaseSchema for Vote {
    fn columns() -> &'static [ColumnDef] {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::primary_key("id"),
            ColumnDef {
                references: Some("links(id)"),
                ..ColumnDef::required("link_id", "INTEGER")
            },
            ColumnDef {
                references: Some("users(id)"),
                ..ColumnDef::required("user_id", "INTEGER")
            },
        ];
        COLUMNS
    }

    fn table_constraints() -> &'static [&'static str] {
        &["UNIQUE (link_id, user_id)"]
    }
}

impl FromSqlRow for Vote {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            link_id: row.try_get("link_id")?,
            user_id: row.try_get("user_id")?,
        })
    }
}

impl HasKey for Vote {
    fn key(&self, column: &str) -> Option<i32> {
        match column {
            "id" => Some(self.id),
            "link_id" => Some(self.link_id),
            "user_id" => Some(self.user_id),
            _ => None,
        }
    }
}
