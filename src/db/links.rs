//! Links repository

use sqlx::SqlitePool;

use super::sqlite_helpers::now_iso8601;
use crate::entities::{Link, LinkOrderByInput, LinkWhere};
use crate::orm::{DatabaseEntity, EntityQuery, FromSqlRow};

/// Input for creating a link
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub description: String,
    pub url: String,
    pub posted_by_id: Option<i32>,
}

pub struct LinkRepository {
    pool: SqlitePool,
}

impl LinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn query(filter: &LinkWhere) -> EntityQuery<Link> {
        EntityQuery::new().filter(filter)
    }

    /// One page of links matching the filter.
    ///
    /// Sort objects apply in list order. Without any, rows come back in
    /// store order.
    pub async fn find_many(
        &self,
        filter: &LinkWhere,
        order_by: &[LinkOrderByInput],
        skip: Option<i32>,
        take: Option<i32>,
    ) -> Result<Vec<Link>, sqlx::Error> {
        let mut query = Self::query(filter);
        for order in order_by {
            query = query.order_by(order);
        }
        if let Some(take) = take {
            query = query.limit(take.into());
        }
        if let Some(skip) = skip {
            query = query.offset(skip.into());
        }
        query.fetch_all(&self.pool).await
    }

    /// Number of links matching the filter, ignoring pagination.
    pub async fn count(&self, filter: &LinkWhere) -> Result<i64, sqlx::Error> {
        Self::query(filter).count(&self.pool).await
    }

    /// Get a link by id
    pub async fn get(&self, id: i32) -> Result<Option<Link>, sqlx::Error> {
        EntityQuery::<Link>::new()
            .where_clause("id = ?", id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert a link, stamping `created_at` with the current time.
    pub async fn create(&self, input: CreateLink) -> Result<Link, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (description, url, created_at, posted_by_id) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            Link::TABLE_NAME,
            Link::column_names().join(", ")
        );

        let row = sqlx::query(&sql)
            .bind(&input.description)
            .bind(&input.url)
            .bind(now_iso8601())
            .bind(input.posted_by_id)
            .fetch_one(&self.pool)
            .await?;

        Link::from_row(&row)
    }
}
