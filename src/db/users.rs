//! Users repository for signup and login

use sqlx::SqlitePool;

use super::sqlite_helpers::now_iso8601;
use crate::entities::User;
use crate::orm::{DatabaseEntity, EntityQuery, FromSqlRow};

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user. A duplicate email fails on the UNIQUE constraint.
    pub async fn create(&self, input: CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            User::TABLE_NAME,
            User::column_names().join(", ")
        );

        let row = sqlx::query(&sql)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(now_iso8601())
            .fetch_one(&self.pool)
            .await?;

        User::from_row(&row)
    }

    /// Get a user by id
    pub async fn get(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        EntityQuery::<User>::new()
            .where_clause("id = ?", id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get a user by email (exact match)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        EntityQuery::<User>::new()
            .where_clause("email = ?", email)
            .fetch_optional(&self.pool)
            .await
    }
}
