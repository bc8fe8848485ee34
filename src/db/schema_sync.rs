//! Automatic schema synchronization from entity definitions
//!
//! - Creates missing tables from `DatabaseSchema::create_table_sql`
//! - Adds missing columns to existing tables
//! - Creates the lookup indexes the relationship loaders rely on
//! - Does NOT handle column renames or type changes (requires DB wipe)

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::entities::{Link, User, Vote};
use crate::orm::{ColumnDef, DatabaseSchema};

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub columns_added: Vec<(String, String)>, // (table, column)
    pub errors: Vec<String>,
}

impl SchemaSyncResult {
    fn merge(&mut self, other: SchemaSyncResult) {
        self.tables_created.extend(other.tables_created);
        self.columns_added.extend(other.columns_added);
        self.errors.extend(other.errors);
    }
}

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Get existing columns for a table
async fn get_table_columns(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(i32, String, String, i32, Option<String>, i32)> =
        sqlx::query_as(&format!("PRAGMA table_info({})", table_name))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(_, name, _, _, _, _)| name).collect())
}

/// Sync a single entity's table to the database
pub async fn sync_entity<E: DatabaseSchema>(
    pool: &SqlitePool,
) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();
    let table_name = E::TABLE_NAME;

    if !table_exists(pool, table_name).await? {
        let create_sql = E::create_table_sql();
        debug!("Creating table {}: {}", table_name, create_sql);

        match sqlx::query(&create_sql).execute(pool).await {
            Ok(_) => {
                info!("Created table: {}", table_name);
                result.tables_created.push(table_name.to_string());
            }
            Err(e) => {
                let msg = format!("Failed to create table {}: {}", table_name, e);
                warn!("{}", msg);
                result.errors.push(msg);
            }
        }
    } else {
        let existing_columns = get_table_columns(pool, table_name).await?;

        for col_def in E::columns() {
            if existing_columns.iter().any(|c| c == col_def.name) {
                continue;
            }

            let alter_sql = generate_add_column_sql(table_name, col_def);
            debug!("Adding column to {}: {}", table_name, alter_sql);

            match sqlx::query(&alter_sql).execute(pool).await {
                Ok(_) => {
                    info!("Added column {}.{}", table_name, col_def.name);
                    result
                        .columns_added
                        .push((table_name.to_string(), col_def.name.to_string()));

                    if col_def.unique {
                        let index_sql = generate_unique_index_sql(table_name, col_def);
                        if let Err(e) = sqlx::query(&index_sql).execute(pool).await {
                            let msg = format!(
                                "Failed to enforce unique {}.{}: {}",
                                table_name, col_def.name, e
                            );
                            warn!("{}", msg);
                            result.errors.push(msg);
                        }
                    }
                }
                Err(e) => {
                    let msg = format!(
                        "Failed to add column {}.{}: {}",
                        table_name, col_def.name, e
                    );
                    warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        }
    }

    Ok(result)
}

/// Generate ALTER TABLE ADD COLUMN SQL
fn generate_add_column_sql(table_name: &str, col: &ColumnDef) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        table_name, col.name, col.sql_type
    );

    // SQLite cannot add PRIMARY KEY or UNIQUE columns, and NOT NULL needs a default.
    // Uniqueness is restored by `generate_unique_index_sql`.
    if !col.nullable {
        let default_val = match col.sql_type {
            "TEXT" => "''",
            "INTEGER" => "0",
            "REAL" => "0.0",
            _ => "''",
        };
        sql.push_str(&format!(" NOT NULL DEFAULT {}", default_val));
    }

    if let Some(target) = col.references {
        sql.push_str(&format!(" REFERENCES {}", target));
    }

    sql
}

/// ALTER TABLE cannot add a UNIQUE column, so added ones get a unique index.
fn generate_unique_index_sql(table_name: &str, col: &ColumnDef) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_{col} ON {table}({col})",
        table = table_name,
        col = col.name
    )
}

/// Indexes backing the batched relation lookups.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_links_posted_by_id ON links(posted_by_id)",
    "CREATE INDEX IF NOT EXISTS idx_votes_link_id ON votes(link_id)",
];

async fn create_indexes(pool: &SqlitePool) -> SchemaSyncResult {
    let mut result = SchemaSyncResult::default();
    for stmt in INDEXES {
        if let Err(e) = sqlx::query(stmt).execute(pool).await {
            let msg = format!("Failed to create index ({}): {}", stmt, e);
            warn!("{}", msg);
            result.errors.push(msg);
        }
    }
    result
}

/// Sync all entity tables to the database.
///
/// Called at startup. Tables are synced parents first so foreign key
/// targets exist before the tables that reference them.
pub async fn sync_all_entity_schemas(pool: &SqlitePool) -> SchemaSyncResult {
    let mut total_result = SchemaSyncResult::default();

    macro_rules! sync_one {
        ($entity:ty) => {
            match sync_entity::<$entity>(pool).await {
                Ok(result) => total_result.merge(result),
                Err(e) => {
                    total_result.errors.push(format!(
                        "Error syncing {}: {}",
                        stringify!($entity),
                        e
                    ));
                }
            }
        };
    }

    sync_one!(User);
    sync_one!(Link);
    sync_one!(Vote);

    total_result.merge(create_indexes(pool).await);

    total_result
}
