//! GitHub GraphQL API access.
//!
//! Provides the `GraphQLTransport` seam with its reqwest-backed production
//! client, plus token lookup via environment or `gh auth token`.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod mock;
mod token;

pub use client::{DEFAULT_GRAPHQL_URL, GitHubClient, GraphQLTransport, query};
pub use error::{GitHubError, GraphQLErrorEntry};
pub use token::resolve_token;
