#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use gamerank_api::auth::jwt::{generate_access_token, JwtConfig};
use gamerank_api::config::ServerConfig;
use gamerank_api::router::build_app_router;
use gamerank_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, with all middleware, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A valid bearer token for `user_id`.
pub fn token_for(user_id: i64) -> String {
    generate_access_token(user_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder("GET", uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("GET", uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, "POST", uri, None, body).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, "POST", uri, Some(token), body).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, "PUT", uri, Some(token), body).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder("DELETE", uri, Some(token)).body(Body::empty()).unwrap()).await
}

async fn json_request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = builder(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Insert a game and a library entry for it, returning the entry id.
pub async fn seed_entry(pool: &PgPool, user_id: i64, game_name: &str) -> i64 {
    let game_id: i64 = sqlx::query_scalar("INSERT INTO games (name) VALUES ($1) RETURNING id")
        .bind(game_name)
        .fetch_one(pool)
        .await
        .unwrap();
    sqlx::query_scalar(
        "INSERT INTO library_entries (user_id, game_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(game_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a game list with the given members (in order), returning its public id.
pub async fn seed_game_list(
    pool: &PgPool,
    owner_id: i64,
    name: &str,
    is_public: bool,
    members: &[i64],
) -> Uuid {
    let public_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO game_lists (public_id, owner_id, name, is_public) VALUES ($1, $2, $3, $4)",
    )
    .bind(public_id)
    .bind(owner_id)
    .bind(name)
    .bind(is_public)
    .execute(pool)
    .await
    .unwrap();
    for (position, entry_id) in members.iter().enumerate() {
        add_game_list_member(pool, public_id, *entry_id, position as i32).await;
    }
    public_id
}

pub async fn add_game_list_member(
    pool: &PgPool,
    game_list_public_id: Uuid,
    entry_id: i64,
    position: i32,
) {
    sqlx::query(
        "INSERT INTO game_list_entries (game_list_id, library_entry_id, position) \
         SELECT id, $2, $3 FROM game_lists WHERE public_id = $1",
    )
    .bind(game_list_public_id)
    .bind(entry_id)
    .bind(position)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn remove_game_list_member(pool: &PgPool, game_list_public_id: Uuid, entry_id: i64) {
    sqlx::query(
        "DELETE FROM game_list_entries \
         WHERE library_entry_id = $2 \
           AND game_list_id = (SELECT id FROM game_lists WHERE public_id = $1)",
    )
    .bind(game_list_public_id)
    .bind(entry_id)
    .execute(pool)
    .await
    .unwrap();
}
