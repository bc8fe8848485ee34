//! GraphQL entity types
//!
//! Each entity is both a GraphQL object and an ORM entity: it describes its
//! table for schema sync and decodes its own rows.

pub mod feed;
pub mod link;
pub mod user;
pub mod vote;

pub use feed::{Feed, FeedArgs};
pub use link::{Link, LinkOrderByInput, LinkWhere};
pub use user::User;
pub use vote::Vote;
