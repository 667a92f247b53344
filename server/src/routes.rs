//! Route handlers for `/api/users`, `/api/posts`, `/api/health` and the
//! root document.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::error::ApiError;
use crate::extract::Payload;
use crate::models::{
    parse_id, CreatePost, CreateUser, Health, Message, Post, RootDocument, User,
};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User not found";
const POST_NOT_FOUND: &str = "Post not found";
const USER_FIELDS_REQUIRED: &str = "Name and email are required";
const POST_FIELDS_REQUIRED: &str = "Title, content, and authorId are required";

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.list().await)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = match parse_id(&id) {
        Some(id) => state.users.get_by_id(id).await,
        None => None,
    };
    user.map(Json).ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

pub async fn create_user(
    State(state): State<AppState>,
    Payload(input): Payload<CreateUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let draft = input
        .into_draft()
        .ok_or_else(|| ApiError::bad_request(USER_FIELDS_REQUIRED))?;
    let user = state.users.insert(draft).await;
    info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.posts.list().await)
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = match parse_id(&id) {
        Some(id) => state.posts.get_by_id(id).await,
        None => None,
    };
    post.map(Json).ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))
}

pub async fn create_post(
    State(state): State<AppState>,
    Payload(input): Payload<CreatePost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let draft = input
        .into_draft()
        .ok_or_else(|| ApiError::bad_request(POST_FIELDS_REQUIRED))?;
    let post = state.posts.insert(draft).await;
    info!(post_id = post.id, author_id = post.author_id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK".to_string(),
        message: "Backend server is running!".to_string(),
        environment: state.config.environment.as_str().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn root(State(state): State<AppState>) -> Json<RootDocument> {
    Json(RootDocument {
        message: "Backend API Server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.as_str().to_string(),
        endpoints: ["/api/health", "/api/users", "/api/posts"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

pub async fn not_found() -> (StatusCode, Json<Message>) {
    (
        StatusCode::NOT_FOUND,
        Json(Message {
            message: "Endpoint not found".to_string(),
        }),
    )
}
