//! GraphQL API
//!
//! The single API surface of the service. Entities live in
//! `crate::entities`; this module holds the roots, loaders and auth glue.

pub mod auth;
pub mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
pub mod service;


pub use auth::AuthConfig;
pub use schema::{LinkboardSchema, build_schema};
