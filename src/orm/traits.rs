//! Core traits for the ORM layer
//!
//! Entities implement these by hand in `crate::entities`; the query builder
//! and schema sync only ever talk to the traits.

use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, query::Query};

/// Column definition for schema generation.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// SQLite column type (TEXT, INTEGER, REAL, BLOB)
    pub sql_type: &'static str,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Whether this is the primary key (an INTEGER key aliases the rowid)
    pub is_primary_key: bool,
    /// Whether values must be unique across rows
    pub unique: bool,
    /// Foreign key target, e.g. "users(id)"
    pub references: Option<&'static str>,
}

impl ColumnDef {
    /// Shorthand for a NOT NULL column with no constraints
    pub const fn required(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            is_primary_key: false,
            unique: false,
            references: None,
        }
    }

    /// Shorthand for an INTEGER primary key
    pub const fn primary_key(name: &'static str) -> Self {
        Self {
            is_primary_key: true,
            ..Self::required(name, "INTEGER")
        }
    }

    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }

        if !self.nullable && !self.is_primary_key {
            sql.push_str(" NOT NULL");
        }

        if self.unique {
            sql.push_str(" UNIQUE");
        }

        if let Some(target) = self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }

        sql
    }
}

/// Trait for database schema generation and migration.
pub trait DatabaseSchema: DatabaseEntity {
    /// Get all column definitions for this entity's table
    fn columns() -> &'static [ColumnDef];

    /// Table-level constraints appended after the columns
    fn table_constraints() -> &'static [&'static str] {
        &[]
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL
    fn create_table_sql() -> String {
        let mut defs: Vec<String> = Self::columns().iter().map(|c| c.to_sql()).collect();
        defs.extend(Self::table_constraints().iter().map(|c| c.to_string()));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            Self::TABLE_NAME,
            defs.join(",\n  ")
        )
    }
}

/// Metadata about a database entity (table).
pub trait DatabaseEntity: Sized + Send + Sync {
    /// The SQL table name (e.g., "links")
    const TABLE_NAME: &'static str;

    /// The primary key column name
    const PRIMARY_KEY: &'static str = "id";

    /// List of all column names in the table
    fn column_names() -> &'static [&'static str];

    /// Build a SELECT query for all columns
    fn select_sql() -> String {
        let columns = Self::column_names().join(", ");
        format!("SELECT {} FROM {}", columns, Self::TABLE_NAME)
    }

    /// Column list qualified with the table name and aliased back to the
    /// bare name, for joins that must still decode through [FromSqlRow].
    fn qualified_columns() -> String {
        Self::column_names()
            .iter()
            .map(|c| format!("{}.{} AS {}", Self::TABLE_NAME, c, c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Trait for applying filters to a SQL query.
pub trait DatabaseFilter: Send + Sync {
    /// Return the WHERE clause fragments (with bare `?` placeholders)
    /// and the values to bind, in placeholder order.
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>);

    /// Check if the filter has any conditions
    fn is_empty(&self) -> bool;
}

/// Trait for applying sort order to a SQL query.
pub trait DatabaseOrderBy: Send + Sync {
    /// Get the ORDER BY clause fragment (e.g., "url ASC, created_at DESC")
    fn to_sql_order(&self) -> Option<String>;
}

/// Trait for decoding a database row into an entity.
pub trait FromSqlRow: Sized {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

/// Integer keys an entity exposes for grouping batch-loaded rows.
pub trait HasKey {
    /// Value of the given key column, or None if the entity has no such
    /// column or the value is NULL.
    fn key(&self, column: &str) -> Option<i32>;
}

/// Sort direction for ORDER BY clauses.
#[derive(async_graphql::Enum, Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[graphql(name = "Sort")]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    #[graphql(name = "asc")]
    Asc,
    #[graphql(name = "desc")]
    Desc,
}

impl Sort {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            Sort::Asc => "ASC",
            Sort::Desc => "DESC",
        }
    }
}

/// Represents a SQL value that can be bound to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
}

impl SqlValue {
    /// Bind this value as the next positional parameter
    pub fn bind_to_query<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
        }
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}
