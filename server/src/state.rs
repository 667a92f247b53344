use std::sync::Arc;

use crate::config::ServerConfig;
use crate::models::{Post, User};
use crate::store::{seed_posts, seed_users, InMemoryRepository, Repository};

/// Shared handler state. Built once per server and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn Repository<User>>,
    pub posts: Arc<dyn Repository<Post>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        posts: Arc<dyn Repository<Post>>,
        config: ServerConfig,
    ) -> Self {
        Self {
            users,
            posts,
            config: Arc::new(config),
        }
    }

    /// In-memory repositories loaded with the sample users and posts.
    pub fn seeded(config: ServerConfig) -> Self {
        Self::new(
            Arc::new(InMemoryRepository::seeded(seed_users())),
            Arc::new(InMemoryRepository::seeded(seed_posts())),
            config,
        )
    }
}
