pub mod auth;
pub mod links;
pub mod votes;

pub use auth::AuthMutations;
pub use links::LinkMutations;
pub use votes::VoteMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result, ResultExt};

    pub(crate) use crate::db::*;
    pub(crate) use crate::entities::*;
    pub(crate) use crate::error::ApiError;
    pub(crate) use crate::graphql::auth::{AuthConfig, AuthExt};
}
