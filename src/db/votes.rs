//! Votes repository

use sqlx::SqlitePool;

use crate::entities::Vote;
use crate::orm::{DatabaseEntity, FromSqlRow};

pub struct VoteRepository {
    pool: SqlitePool,
}

impl VoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record `user_id`'s vote on `link_id`.
    ///
    /// Fails on the foreign keys for unknown ids and on the UNIQUE
    /// constraint when the user already voted for the link.
    pub async fn create(&self, link_id: i32, user_id: i32) -> Result<Vote, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (link_id, user_id) VALUES (?1, ?2) RETURNING {}",
            Vote::TABLE_NAME,
            Vote::column_names().join(", ")
        );

        let row = sqlx::query(&sql)
            .bind(link_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Vote::from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateLink, CreateUser, Database};
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_vote_once_per_link() {
        let db = Database::test_database().await;
        let user = db
            .users()
            .create(CreateUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let link = db
            .links()
            .create(CreateLink {
                description: "d".to_string(),
                url: "u".to_string(),
                posted_by_id: Some(user.id),
            })
            .await
            .unwrap();

        let vote = db.votes().create(link.id, user.id).await.unwrap();
        assert_eq!(vote.link_id, link.id);
        assert_eq!(vote.user_id, user.id);

        let err = db.votes().create(link.id, user.id).await.unwrap_err();
        assert_matches!(err, sqlx::Error::Database(e) if e.is_unique_violation());
    }

    #[tokio::test]
    async fn test_vote_on_missing_link() {
        let db = Database::test_database().await;
        let err = db.votes().create(7, 7).await.unwrap_err();
        assert_matches!(err, sqlx::Error::Database(e) if e.is_foreign_key_violation());
    }
}
