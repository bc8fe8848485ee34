//! Link Entity
//!
//! A posted URL with a description. `postedBy` and `voters` are resolved on
//! demand through DataLoaders so a feed page costs one query per relation,
//! not one per link.

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, InputObject, Result, ResultExt, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::decode_datetime;
use crate::error::ApiError;
use crate::graphql::loaders::{EntityByIdLoader, VotersLoader};
use crate::orm::{
    ColumnDef, DatabaseEntity, DatabaseFilter, DatabaseOrderBy, DatabaseSchema, FromSqlRow,
    HasKey, Sort, SqlValue,
};

use super::user::User;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Link {
    pub id: i32,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,

    #[graphql(skip)]
    pub posted_by_id: Option<i32>,
}

#[ComplexObject]
impl Link {
    /// The user who posted this link
    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = self.posted_by_id else {
            return Ok(None);
        };
        ctx.data_unchecked::<DataLoader<EntityByIdLoader<User>>>()
            .load_one(user_id)
            .await
            .map_err(ApiError::from)
            .extend()
    }

    /// Users who voted for this link
    async fn voters(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let voters = ctx
            .data_unchecked::<DataLoader<VotersLoader>>()
            .load_one(self.id)
            .await
            .map_err(ApiError::from)
            .extend()?;
        Ok(voters.unwrap_or_default())
    }
}

impl DatabaseEntity for Link {
    const TABLE_NAME: &'static str = "links";

    fn column_names() -> &'static [&'static str] {
        &["id", "description", "url", "created_at", "posted_by_id"]
    }
}

impl DatabaseSchema for Link {
    fn columns() -> &'static [ColumnDef] {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::primary_key("id"),
            ColumnDef::required("description", "TEXT"),
            ColumnDef::required("url", "TEXT"),
            ColumnDef::required("created_at", "TEXT"),
            ColumnDef {
                nullable: true,
                references: Some("users(id)"),
                ..ColumnDef::required("posted_by_id", "INTEGER")
            },
        ];
        COLUMNS
    }
}

impl FromSqlRow for Link {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            url: row.try_get("url")?,
            created_at: decode_datetime(row, "created_at")?,
            posted_by_id: row.try_get("posted_by_id")?,
        })
    }
}

impl HasKey for Link {
    fn key(&self, column: &str) -> Option<i32> {
        match column {
            "id" => Some(self.id),
            "posted_by_id" => self.posted_by_id,
            _ => None,
        }
    }
}

/// Per-field sort direction for the feed.
///
/// Keys set on one object apply in declaration order; objects in a list
/// apply in list order.
#[derive(InputObject, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[graphql(name = "LinkOrderByInput")]
#[serde(rename_all = "camelCase")]
pub struct LinkOrderByInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Sort>,
}

impl DatabaseOrderBy for LinkOrderByInput {
    fn to_sql_order(&self) -> Option<String> {
        let keys: Vec<String> = [
            ("description", self.description),
            ("url", self.url),
            ("created_at", self.created_at),
        ]
        .into_iter()
        .filter_map(|(column, dir)| dir.map(|d| format!("{} {}", column, d.to_sql())))
        .collect();

        if keys.is_empty() {
            None
        } else {
            Some(keys.join(", "))
        }
    }
}

/// Substring match on description OR url.
#[derive(Clone, Debug, Default)]
pub struct LinkWhere {
    pub contains: Option<String>,
}

impl LinkWhere {
    /// An empty search string matches everything.
    pub fn contains(term: Option<&str>) -> Self {
        Self {
            contains: term.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }
}

impl DatabaseFilter for LinkWhere {
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        match &self.contains {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                (
                    vec![
                        r"(description LIKE ? ESCAPE '\' OR url LIKE ? ESCAPE '\')".to_string(),
                    ],
                    vec![SqlValue::String(pattern.clone()), SqlValue::String(pattern)],
                )
            }
            None => (Vec::new(), Vec::new()),
        }
    }

    fn is_empty(&self) -> bool {
        self.contains.is_none()
    }
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_order_by_declaration_order() {
        let order = LinkOrderByInput {
            created_at: Some(Sort::Desc),
            description: Some(Sort::Asc),
            ..Default::default()
        };
        assert_eq!(
            order.to_sql_order().as_deref(),
            Some("description ASC, created_at DESC")
        );
        assert_eq!(LinkOrderByInput::default().to_sql_order(), None);
    }

    #[test]
    fn test_where_matches_both_columns() {
        let (conditions, values) = LinkWhere::contains(Some("graph")).to_sql_conditions();
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].contains("description LIKE ?"));
        assert!(conditions[0].contains(" OR url LIKE ?"));
        assert_eq!(
            values,
            vec![
                SqlValue::String("%graph%".to_string()),
                SqlValue::String("%graph%".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_search_is_no_filter() {
        assert!(LinkWhere::contains(Some("")).is_empty());
        assert!(LinkWhere::contains(None).is_empty());
    }

    #[test]
    fn test_like_wildcards_escaped() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }

    #[test]
    fn test_order_by_serialization_skips_unset() {
        let order = LinkOrderByInput {
            created_at: Some(Sort::Desc),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&order).unwrap(),
            r#"{"createdAt":"desc"}"#
        );
    }
}
