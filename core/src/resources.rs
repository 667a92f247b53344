//! Resource accessors: one type per API collection, each call a direct,
//! unretried delegation to `RequestClient`. Validation is left entirely to
//! the server.

use crate::client::RequestClient;
use crate::error::ApiError;
use crate::types::{CreatePost, CreateUser, HealthStatus, Post, User};

#[derive(Debug, Clone)]
pub struct UsersApi {
    client: RequestClient,
}

impl UsersApi {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, ApiError> {
        self.client.get("/users").await
    }

    /// Fails with `ApiError::NotFound` for an unknown id.
    pub async fn get_by_id(&self, id: u64) -> Result<User, ApiError> {
        self.client.get(&format!("/users/{id}")).await
    }

    /// Fails with `ApiError::Validation` when a field is missing.
    pub async fn create(&self, input: &CreateUser) -> Result<User, ApiError> {
        self.client.post("/users", input).await
    }
}

#[derive(Debug, Clone)]
pub struct PostsApi {
    client: RequestClient,
}

impl PostsApi {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    pub async fn list_all(&self) -> Result<Vec<Post>, ApiError> {
        self.client.get("/posts").await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Post, ApiError> {
        self.client.get(&format!("/posts/{id}")).await
    }

    pub async fn create(&self, input: &CreatePost) -> Result<Post, ApiError> {
        self.client.post("/posts", input).await
    }
}

/// All accessors over one request client.
#[derive(Debug, Clone)]
pub struct TabasApi {
    client: RequestClient,
    users: UsersApi,
    posts: PostsApi,
}

impl TabasApi {
    pub fn new(client: RequestClient) -> Self {
        Self {
            users: UsersApi::new(client.clone()),
            posts: PostsApi::new(client.clone()),
            client,
        }
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }

    pub fn posts(&self) -> &PostsApi {
        &self.posts
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.client.get("/health").await
    }
}
