//! Cached reads and cache-aware writes for the Tabas resources.
//!
//! Lists and records stay fresh until a write invalidates them; creating a
//! user or post also appends it to the cached list so readers see it before
//! the refetch lands. The health probe is polled.

use std::time::Duration;

use crate::cache::{CacheKey, Mutation, QueryClient, QuerySubscription};
use crate::client::RequestClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::resources::TabasApi;
use crate::types::{CreatePost, CreateUser, HealthStatus, Post, User};

pub mod keys {
    use crate::cache::CacheKey;

    pub fn users() -> CacheKey {
        CacheKey::new("users")
    }

    pub fn user(id: u64) -> CacheKey {
        CacheKey::item("users", id)
    }

    pub fn posts() -> CacheKey {
        CacheKey::new("posts")
    }

    pub fn post(id: u64) -> CacheKey {
        CacheKey::item("posts", id)
    }

    pub fn health() -> CacheKey {
        CacheKey::new("health")
    }
}

#[derive(Debug, Clone)]
pub struct TabasQueries {
    api: TabasApi,
    cache: QueryClient,
    health_interval: Duration,
}

impl TabasQueries {
    pub fn new(api: TabasApi, cache: QueryClient, health_interval: Duration) -> Self {
        Self {
            api,
            cache,
            health_interval,
        }
    }

    pub fn from_config(config: &ClientConfig, cache: QueryClient) -> Result<Self, ApiError> {
        let client = RequestClient::from_config(config)?;
        Ok(Self::new(
            TabasApi::new(client),
            cache,
            config.health_poll_interval,
        ))
    }

    pub fn api(&self) -> &TabasApi {
        &self.api
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub fn users(&self) -> QuerySubscription<Vec<User>> {
        let api = self.api.clone();
        self.cache.subscribe(keys::users(), move || {
            let api = api.clone();
            async move { api.users().list_all().await }
        })
    }

    /// `None` for id 0, which never names a user.
    pub fn user(&self, id: u64) -> Option<QuerySubscription<User>> {
        if id == 0 {
            return None;
        }
        let api = self.api.clone();
        Some(self.cache.subscribe(keys::user(id), move || {
            let api = api.clone();
            async move { api.users().get_by_id(id).await }
        }))
    }

    pub async fn create_user(&self, input: &CreateUser) -> Result<User, ApiError> {
        let effects = list_effects(keys::users());
        self.cache.mutate(self.api.users().create(input), &effects).await
    }

    pub fn posts(&self) -> QuerySubscription<Vec<Post>> {
        let api = self.api.clone();
        self.cache.subscribe(keys::posts(), move || {
            let api = api.clone();
            async move { api.posts().list_all().await }
        })
    }

    pub fn post(&self, id: u64) -> Option<QuerySubscription<Post>> {
        if id == 0 {
            return None;
        }
        let api = self.api.clone();
        Some(self.cache.subscribe(keys::post(id), move || {
            let api = api.clone();
            async move { api.posts().get_by_id(id).await }
        }))
    }

    pub async fn create_post(&self, input: &CreatePost) -> Result<Post, ApiError> {
        let effects = list_effects(keys::posts());
        self.cache.mutate(self.api.posts().create(input), &effects).await
    }

    /// Health probe, refetched every `health_interval` while subscribed.
    pub fn health(&self) -> QuerySubscription<HealthStatus> {
        let api = self.api.clone();
        self.cache.poll(
            keys::health(),
            move || {
                let api = api.clone();
                async move { api.health().await }
            },
            self.health_interval,
        )
    }
}

fn list_effects(list: CacheKey) -> Mutation {
    Mutation::new().invalidates(list.clone()).appends_to(list)
}
