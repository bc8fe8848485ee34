//! GraphQL schema definition
//!
//! Query and mutation roots are merged from the per-domain objects in
//! `queries/` and `mutations/`.

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;
use crate::entities::{Link, User};

use super::auth::AuthConfig;
use super::loaders::{EntityByIdLoader, RelationLoader, VotersLoader};
use super::mutations::{AuthMutations, LinkMutations, VoteMutations};
use super::queries::{LinkQueries, UserQueries};

#[derive(MergedObject, Default)]
pub struct QueryRoot(LinkQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(LinkMutations, VoteMutations, AuthMutations);

/// The GraphQL schema type
pub type LinkboardSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema with the database handle, auth settings and
/// the relationship loaders.
pub fn build_schema(db: Database, auth: AuthConfig) -> LinkboardSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .extension(Tracing)
        .data(DataLoader::new(
            EntityByIdLoader::<User>::new(db.clone()),
            tokio::spawn,
        ))
        .data(DataLoader::new(
            EntityByIdLoader::<Link>::new(db.clone()),
            tokio::spawn,
        ))
        .data(DataLoader::new(
            RelationLoader::<Link>::new(db.clone(), "posted_by_id"),
            tokio::spawn,
        ))
        .data(DataLoader::new(VotersLoader::new(db.clone()), tokio::spawn))
        .data(auth)
        .data(db)
        .finish()
}
