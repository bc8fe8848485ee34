//! SQL Query Builder for the ORM layer
//!
//! Provides a type-safe query builder that works with `DatabaseEntity` types
//! and uses parameterized queries via sqlx to prevent SQL injection.

use sqlx::{Row, SqlitePool};

use super::traits::{DatabaseEntity, DatabaseFilter, DatabaseOrderBy, FromSqlRow, Sort, SqlValue};

/// A query builder for database entities.
///
/// Builds parameterized SQL queries for SELECT and COUNT operations with
/// filtering, sorting, and pagination support. Pagination values are passed
/// through untouched; SQLite decides what negative values mean.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: std::marker::PhantomData<E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    param_counter: usize,
}

impl<E: DatabaseEntity + FromSqlRow> EntityQuery<E> {
    /// Create a new query builder for the entity type.
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
            param_counter: 0,
        }
    }

    /// Add a filter to the query.
    pub fn filter<F: DatabaseFilter>(mut self, filter: &F) -> Self {
        if !filter.is_empty() {
            let (conditions, values) = filter.to_sql_conditions();
            for condition in conditions {
                let numbered = self.number_params(&condition);
                self.where_clauses.push(numbered);
            }
            self.values.extend(values);
        }
        self
    }

    /// Add a raw WHERE clause condition with a single `?` placeholder.
    pub fn where_clause(mut self, condition: &str, value: impl Into<SqlValue>) -> Self {
        let numbered = self.number_params(condition);
        self.where_clauses.push(numbered);
        self.values.push(value.into());
        self
    }

    /// Restrict `column` to the given set of values.
    ///
    /// An empty set matches nothing.
    pub fn where_in<V: Into<SqlValue>>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.where_clauses.push("0".to_string());
            return self;
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        let numbered = self.number_params(&format!("{} IN ({})", column, placeholders));
        self.where_clauses.push(numbered);
        self.values.extend(values);
        self
    }

    /// Append sort keys from an order-by input.
    pub fn order_by<O: DatabaseOrderBy>(mut self, order: &O) -> Self {
        if let Some(order_sql) = order.to_sql_order() {
            self.order_clauses.push(order_sql);
        }
        self
    }

    /// Append a single sort key.
    pub fn order_by_column(mut self, column: &str, direction: Sort) -> Self {
        self.order_clauses
            .push(format!("{} {}", column, direction.to_sql()));
        self
    }

    /// Set limit directly.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set offset directly.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Rewrite bare `?` placeholders to `?N` using the running counter.
    fn number_params(&mut self, condition: &str) -> String {
        let mut result = String::with_capacity(condition.len() + 8);
        let mut chars = condition.chars().peekable();

        while let Some(c) = chars.next() {
            result.push(c);
            if c == '?' && !chars.peek().is_some_and(|n| n.is_ascii_digit()) {
                self.param_counter += 1;
                result.push_str(&self.param_counter.to_string());
            }
        }

        result
    }

    fn push_where(&self, sql: &mut String) {
        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }
    }

    /// Build the SQL query string.
    pub(crate) fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        self.push_where(&mut sql);

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        if self.limit.is_some() || self.offset.is_some() {
            sql.push_str(&format!(" LIMIT {}", self.limit.unwrap_or(-1)));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    /// Build a COUNT query string. Ordering and pagination are ignored.
    pub(crate) fn build_count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", E::TABLE_NAME);
        self.push_where(&mut sql);
        sql
    }

    /// Execute the query and return all matching entities.
    pub async fn fetch_all(self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        let rows = query.fetch_all(pool).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Execute the query and return the first entity, if any.
    pub async fn fetch_optional(self, pool: &SqlitePool) -> Result<Option<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query (one)");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        match query.fetch_optional(pool).await? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Execute a COUNT query.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        let row = query.fetch_one(pool).await?;
        row.try_get(0)
    }
}

impl<E: DatabaseEntity + FromSqlRow> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlx::sqlite::SqliteRow;

    struct Widget;

    impl DatabaseEntity for Widget {
        const TABLE_NAME: &'static str = "widgets";

        fn column_names() -> &'static [&'static str] {
            &["id", "name"]
        }
    }

    impl FromSqlRow for Widget {
        fn from_row(_row: &SqliteRow) -> Result<Self, sqlx::Error> {
            Ok(Widget)
        }
    }

    struct NameLike(&'static str);

    impl DatabaseFilter for NameLike {
        fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
            (
                vec!["(name LIKE ? OR name = ?)".to_string()],
                vec![SqlValue::from(self.0), SqlValue::from(self.0)],
            )
        }

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    #[test]
    fn test_plain_select() {
        let q = EntityQuery::<Widget>::new();
        assert_eq!(q.build_sql(), "SELECT id, name FROM widgets");
        assert_eq!(q.build_count_sql(), "SELECT COUNT(*) FROM widgets");
    }

    #[test]
    fn test_params_numbered_across_clauses() {
        let q = EntityQuery::<Widget>::new()
            .where_clause("id > ?", 3)
            .filter(&NameLike("a"))
            .where_in("id", [1, 2]);

        assert_eq!(
            q.build_sql(),
            "SELECT id, name FROM widgets WHERE id > ?1 AND (name LIKE ?2 OR name = ?3) AND id IN (?4, ?5)"
        );
        assert_eq!(q.values.len(), 5);
    }

    #[test]
    fn test_empty_filter_is_skipped() {
        let q = EntityQuery::<Widget>::new().filter(&NameLike(""));
        assert_eq!(q.build_sql(), "SELECT id, name FROM widgets");
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let q = EntityQuery::<Widget>::new().where_in("id", Vec::<i32>::new());
        assert_eq!(q.build_sql(), "SELECT id, name FROM widgets WHERE 0");
    }

    #[test]
    fn test_pagination_and_order() {
        let q = EntityQuery::<Widget>::new()
            .order_by_column("name", Sort::Desc)
            .order_by_column("id", Sort::Asc)
            .limit(2)
            .offset(4);
        assert_eq!(
            q.build_sql(),
            "SELECT id, name FROM widgets ORDER BY name DESC, id ASC LIMIT 2 OFFSET 4"
        );
        // Count ignores the page window
        assert_eq!(q.build_count_sql(), "SELECT COUNT(*) FROM widgets");
    }

    #[test]
    fn test_offset_without_limit() {
        let q = EntityQuery::<Widget>::new().offset(3);
        assert_eq!(q.build_sql(), "SELECT id, name FROM widgets LIMIT -1 OFFSET 3");
    }

    #[test]
    fn test_negative_values_pass_through() {
        let q = EntityQuery::<Widget>::new().limit(-5).offset(-1);
        assert_eq!(q.build_sql(), "SELECT id, name FROM widgets LIMIT -5 OFFSET -1");
    }
}
