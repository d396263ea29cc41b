//! GraphQL API with subscriptions
//!
//! Queries, mutations, and subscriptions over HTTP and WebSocket using
//! async-graphql. Each domain lives in its own queries/mutations module
//! and the roots are merged in `schema.rs`.

pub mod auth;
pub mod helpers;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod subscriptions;
pub mod types;

pub use auth::{CurrentUser, verify_token};
pub use schema::{BookshelfSchema, build_schema};
