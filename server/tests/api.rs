use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tabas_server::models::UserDraft;
use tabas_server::store::{seed_posts, InMemoryRepository};
use tabas_server::{app, router, AppState, Environment, Post, Repository, ServerConfig, User};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

async fn message_of(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let body: Value = body_json(response).await;
    (status, body["message"].as_str().unwrap_or_default().to_string())
}

// --- users ---

#[tokio::test]
async fn list_users_returns_seeded_users() {
    let resp = app().oneshot(get("/api/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(users[0].name, "John Doe");
    assert_eq!(users[2].email, "bob@example.com");
}

#[tokio::test]
async fn get_user_by_id() {
    let resp = app().oneshot(get("/api/users/2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Jane Smith");
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get("/api/users/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn get_user_non_numeric_id_is_not_found() {
    let resp = app().oneshot(get("/api/users/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn create_user_returns_201_with_next_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/users",
            r#"{"name":"Ama","email":"ama@x.com"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 4);
    assert_eq!(user.name, "Ama");
    assert_eq!(user.email, "ama@x.com");
}

#[tokio::test]
async fn create_user_missing_email_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users", r#"{"name":"Ama"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Name and email are required");
}

#[tokio::test]
async fn create_user_without_json_content_type_returns_400() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Name and email are required");
}

#[tokio::test]
async fn create_user_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn create_user_empty_json_body_reports_missing_fields() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users", ""))
        .await
        .unwrap();

    assert_eq!(
        message_of(resp).await,
        (StatusCode::BAD_REQUEST, "Name and email are required".to_string())
    );
}

#[tokio::test]
async fn create_user_wrong_field_type_reports_missing_fields() {
    let resp = app()
        .oneshot(json_request("POST", "/api/users", r#"{"name":"Ama","email":5}"#))
        .await
        .unwrap();

    assert_eq!(
        message_of(resp).await,
        (StatusCode::BAD_REQUEST, "Name and email are required".to_string())
    );
}

#[tokio::test]
async fn create_user_from_form() {
    let resp = app()
        .oneshot(form_request("/api/users", "name=Ama&email=ama%40x.com"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.id, 4);
    assert_eq!(user.email, "ama@x.com");
}

#[tokio::test]
async fn create_user_form_missing_field_returns_400() {
    let resp = app()
        .oneshot(form_request("/api/users", "name=Ama"))
        .await
        .unwrap();

    assert_eq!(
        message_of(resp).await,
        (StatusCode::BAD_REQUEST, "Name and email are required".to_string())
    );
}

// --- posts ---

#[tokio::test]
async fn list_posts_returns_seeded_posts() {
    let resp = app().oneshot(get("/api/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[2].title, "Third Post");
    assert_eq!(posts[2].author_id, 1);
}

#[tokio::test]
async fn list_posts_uses_camel_case_author_id() {
    let resp = app().oneshot(get("/api/posts")).await.unwrap();

    let posts: Value = body_json(resp).await;
    assert_eq!(posts[1]["authorId"], 2);
}

#[tokio::test]
async fn get_post_not_found() {
    let resp = app().oneshot(get("/api/posts/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn create_post_missing_fields_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/posts", r#"{"title":"T"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Title, content, and authorId are required");
}

#[tokio::test]
async fn create_post_parses_string_author_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/posts",
            r#"{"title":"T","content":"C","authorId":"2"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 4);
    assert_eq!(post.author_id, 2);
}

#[tokio::test]
async fn create_post_does_not_validate_author_exists() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/posts",
            r#"{"title":"T","content":"C","authorId":77}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.author_id, 77);
}

#[tokio::test]
async fn create_post_empty_json_body_reports_missing_fields() {
    let resp = app()
        .oneshot(json_request("POST", "/api/posts", ""))
        .await
        .unwrap();

    assert_eq!(
        message_of(resp).await,
        (
            StatusCode::BAD_REQUEST,
            "Title, content, and authorId are required".to_string()
        )
    );
}

#[tokio::test]
async fn create_post_from_form_reads_author_text() {
    let resp = app()
        .oneshot(form_request(
            "/api/posts",
            "title=Chairs&content=Two+oak+chairs&authorId=3",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 4);
    assert_eq!(post.content, "Two oak chairs");
    assert_eq!(post.author_id, 3);
}

#[tokio::test]
async fn create_post_truncates_fractional_author_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/posts",
            r#"{"title":"T","content":"C","authorId":1.5}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.author_id, 1);
}

// --- health, root, fallback ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(get("/api/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Backend server is running!");
    assert_eq!(body["environment"], "development");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'), "{timestamp}");
    assert_eq!(timestamp.len(), "2024-01-01T00:00:00.000Z".len());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let config = ServerConfig {
        environment: Environment::Staging,
        ..ServerConfig::default()
    };
    let resp = router(AppState::seeded(config)).oneshot(get("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Backend API Server");
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_path_returns_json_404() {
    let resp = app().oneshot(get("/api/comments")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Endpoint not found");
}

// --- middleware ---

#[tokio::test]
async fn responses_carry_security_headers_and_trace_id() {
    let resp = app().oneshot(get("/api/health")).await.unwrap();

    let headers = resp.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert!(headers.contains_key("trace-id"));
    assert_eq!(headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn preflight_is_answered_with_configured_origin() {
    let config = ServerConfig {
        environment: Environment::Production,
        frontend_url: Some("https://tabas.example".to_string()),
        ..ServerConfig::default()
    };
    let resp = router(AppState::seeded(config))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/users")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "https://tabas.example");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(body_bytes(resp).await.is_empty());
}

/// Repository whose reads panic, standing in for a handler bug.
struct Exploding;

#[async_trait]
impl Repository<User> for Exploding {
    async fn list(&self) -> Vec<User> {
        panic!("user table unavailable")
    }

    async fn get_by_id(&self, _id: u64) -> Option<User> {
        panic!("user table unavailable")
    }

    async fn insert(&self, _draft: UserDraft) -> User {
        panic!("user table unavailable")
    }
}

#[tokio::test]
async fn handler_panic_becomes_json_500() {
    let state = AppState::new(
        Arc::new(Exploding),
        Arc::new(InMemoryRepository::seeded(seed_posts())),
        ServerConfig::default(),
    );
    let resp = router(state).oneshot(get("/api/users")).await.unwrap();

    assert!(resp.headers().contains_key("trace-id"));
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(
        message_of(resp).await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string()
        )
    );
}

// --- full lifecycle on one router ---

#[tokio::test]
async fn create_then_list_and_get() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/users",
            r#"{"name":"Ama","email":"ama@x.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: User = body_json(resp).await;
    assert_eq!(created.id, 4);

    // list includes the new user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/users"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users.len(), 4);
    assert_eq!(users.last(), Some(&created));

    // get by the assigned id
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/users/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = body_json(resp).await;
    assert_eq!(fetched, created);

    // a second create takes the next id
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/users",
            r#"{"name":"Kofi","email":"kofi@x.com"}"#,
        ))
        .await
        .unwrap();
    let second: User = body_json(resp).await;
    assert_eq!(second.id, 5);
}
