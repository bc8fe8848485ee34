//! ORM Layer
//!
//! A small object-relational layer over sqlx/SQLite. Entities describe their
//! table through [DatabaseEntity] and [DatabaseSchema], decode rows through
//! [FromSqlRow], and GraphQL argument types translate themselves into SQL via
//! [DatabaseFilter] and [DatabaseOrderBy]. [EntityQuery] assembles the pieces
//! into parameterised SELECT and COUNT statements.
//!
//! ```rust,ignore
//! let links = EntityQuery::<Link>::new()
//!     .filter(&LinkWhere::contains("rust"))
//!     .order_by_column("created_at", Sort::Desc)
//!     .limit(10)
//!     .fetch_all(db.pool())
//!     .await?;
//! ```

mod builder;
mod traits;

pub use builder::*;
pub use traits::*;
