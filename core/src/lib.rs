//! Client core for the Tabas marketplace API.
//!
//! # Overview
//! Layers, leaf first:
//! - `http` / `client::TabasClient`: requests and responses as plain data,
//!   built and parsed without touching the network.
//! - `transport` + `client::RequestClient`: one async round-trip per call.
//! - `resources`: users, posts and health accessors.
//! - `cache`: the query/mutation cache (`QueryClient`).
//! - `queries`: the accessors bound to the cache under fixed keys.
//!
//! # Design
//! - DTOs are defined independently from the server crate; end-to-end tests
//!   catch schema drift.
//! - The cache is an explicit context object, never a global.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod queries;
pub mod resources;
pub mod transport;
pub mod types;

pub use cache::{CacheKey, Mutation, QueryClient, QuerySnapshot, QueryStatus, QuerySubscription};
pub use client::{RequestClient, TabasClient};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use listing::{age_label, Listing, ListingKind, ListingOwner};
pub use queries::TabasQueries;
pub use resources::{PostsApi, TabasApi, UsersApi};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreatePost, CreateUser, HealthStatus, Post, User};
