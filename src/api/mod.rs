//! REST route definitions
//!
//! The API itself is GraphQL at /graphql; only probes live here.

pub mod health;
