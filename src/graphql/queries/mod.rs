pub mod links;
pub mod user;

pub use links::LinkQueries;
pub use user::UserQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result, ResultExt};

    pub(crate) use crate::db::Database;
    pub(crate) use crate::entities::*;
    pub(crate) use crate::error::ApiError;
    pub(crate) use crate::graphql::auth::AuthExt;
}
