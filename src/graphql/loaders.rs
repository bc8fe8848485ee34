//! GraphQL DataLoaders for batching database queries
//!
//! DataLoaders solve the N+1 problem by collecting the relation loads issued
//! by sibling resolvers and executing them in a single batch query.
//!
//! 1. When GraphQL resolves `feed { links { postedBy { ... } } }`, each
//!    link's `postedBy` resolver calls `loader.load_one(posted_by_id)`
//! 2. DataLoader batches these calls within the same request tick
//! 3. One query fetches every author: `SELECT ... FROM users WHERE id IN (...)`
//! 4. Results are keyed by id and handed back to each resolver
//!
//! Loaders are registered without a cache, so every request sees the store
//! as it is when the batch runs.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_graphql::dataloader::Loader;
use sqlx::Row;

use crate::db::Database;
use crate::entities::User;
use crate::orm::{DatabaseEntity, EntityQuery, FromSqlRow, HasKey, Sort};

/// Loads entities by primary key.
pub struct EntityByIdLoader<T> {
    db: Database,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> EntityByIdLoader<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }
}

impl<T> Loader<i32> for EntityByIdLoader<T>
where
    T: DatabaseEntity + FromSqlRow + HasKey + Clone + 'static,
{
    type Value = T;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(
            entity = T::TABLE_NAME,
            key_count = keys.len(),
            "Batch loading {} by id",
            T::TABLE_NAME
        );

        let entities = EntityQuery::<T>::new()
            .where_in(T::PRIMARY_KEY, keys.iter().copied())
            .fetch_all(self.db.pool())
            .await
            .map_err(Arc::new)?;

        Ok(entities
            .into_iter()
            .filter_map(|e| e.key(T::PRIMARY_KEY).map(|id| (id, e)))
            .collect())
    }
}

/// A generic loader for a one-to-many relation.
///
/// Given a set of parent ids, loads all child entities where
/// `fk_column = parent_id`, ordered by child id, and groups them by parent.
/// Every requested parent gets an entry, empty when it has no children.
pub struct RelationLoader<T> {
    db: Database,
    fk_column: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> RelationLoader<T> {
    pub fn new(db: Database, fk_column: &'static str) -> Self {
        Self {
            db,
            fk_column,
            _phantom: PhantomData,
        }
    }
}

impl<T> Loader<i32> for RelationLoader<T>
where
    T: DatabaseEntity + FromSqlRow + HasKey + Clone + 'static,
{
    type Value = Vec<T>;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        tracing::debug!(
            entity = T::TABLE_NAME,
            fk_column = self.fk_column,
            parent_count = keys.len(),
            "Batch loading {} for {} parents",
            T::TABLE_NAME,
            keys.len()
        );

        let entities = EntityQuery::<T>::new()
            .where_in(self.fk_column, keys.iter().copied())
            .order_by_column(T::PRIMARY_KEY, Sort::Asc)
            .fetch_all(self.db.pool())
            .await
            .map_err(Arc::new)?;
        let total_loaded = entities.len();

        let mut result: HashMap<i32, Vec<T>> = keys.iter().map(|k| (*k, Vec::new())).collect();
        for entity in entities {
            if let Some(children) = entity
                .key(self.fk_column)
                .and_then(|fk| result.get_mut(&fk))
            {
                children.push(entity);
            }
        }

        tracing::debug!(
            entity = T::TABLE_NAME,
            total_loaded = total_loaded,
            "Batch load complete"
        );

        Ok(result)
    }
}

/// Loads the users who voted for each link, in vote order.
pub struct VotersLoader {
    db: Database,
}

impl VotersLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i32> for VotersLoader {
    type Value = Vec<User>;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let mut result: HashMap<i32, Vec<User>> = keys.iter().map(|k| (*k, Vec::new())).collect();
        if keys.is_empty() {
            return Ok(result);
        }

        tracing::debug!(link_count = keys.len(), "Batch loading voters");

        let placeholders: Vec<String> = (1..=keys.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT {}, votes.link_id AS vote_link_id FROM users \
             JOIN votes ON votes.user_id = users.id \
             WHERE votes.link_id IN ({}) ORDER BY votes.id",
            User::qualified_columns(),
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(key);
        }

        let rows = query
            .fetch_all(self.db.pool())
            .await
            .map_err(Arc::new)?;

        for row in rows {
            let link_id: i32 = row.try_get("vote_link_id").map_err(Arc::new)?;
            let user = User::from_row(&row).map_err(Arc::new)?;
            if let Some(voters) = result.get_mut(&link_id) {
                voters.push(user);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateLink, CreateUser};
    use crate::entities::Link;
    use pretty_assertions::assert_eq;

    async fn user(db: &Database, name: &str) -> User {
        db.users()
            .create(CreateUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    async fn link(db: &Database, posted_by_id: Option<i32>) -> Link {
        db.links()
            .create(CreateLink {
                description: "d".to_string(),
                url: "u".to_string(),
                posted_by_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_by_id_skips_missing() {
        let db = Database::test_database().await;
        let alice = user(&db, "Alice").await;

        let loaded = EntityByIdLoader::<User>::new(db.clone())
            .load(&[alice.id, 99])
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[&alice.id].name, "Alice");
    }

    #[tokio::test]
    async fn test_relation_groups_by_parent() {
        let db = Database::test_database().await;
        let alice = user(&db, "Alice").await;
        let bob = user(&db, "Bob").await;
        let first = link(&db, Some(alice.id)).await;
        link(&db, Some(bob.id)).await;
        let third = link(&db, Some(alice.id)).await;
        link(&db, None).await;

        let loaded = RelationLoader::<Link>::new(db.clone(), "posted_by_id")
            .load(&[alice.id, bob.id, 77])
            .await
            .unwrap();

        let ids = |k: i32| loaded[&k].iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids(alice.id), vec![first.id, third.id]);
        assert_eq!(ids(bob.id).len(), 1);
        assert!(loaded[&77].is_empty());
    }

    #[tokio::test]
    async fn test_voters_per_link() {
        let db = Database::test_database().await;
        let alice = user(&db, "Alice").await;
        let bob = user(&db, "Bob").await;
        let voted = link(&db, None).await;
        let ignored = link(&db, None).await;
        db.votes().create(voted.id, bob.id).await.unwrap();
        db.votes().create(voted.id, alice.id).await.unwrap();

        let loaded = VotersLoader::new(db.clone())
            .load(&[voted.id, ignored.id])
            .await
            .unwrap();

        let names: Vec<&str> = loaded[&voted.id].iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
        assert!(loaded[&ignored.id].is_empty());
    }
}
