//! A jsonplaceholder-shaped test service for the invocation engine.
//!
//! Routes:
//! - `GET /posts` with optional `_limit` / `_page` pagination
//! - `POST /posts` creating `{title, body, userId}`
//! - `GET /posts/{id}`, `DELETE /posts/{id}`
//! - `GET /ping` returning plain text, for non-JSON body handling
//! - `GET /stutter` failing with 503 a configured number of times before
//!   succeeding, for exercising retry policy over real HTTP

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU32, Ordering},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(rename = "_limit")]
    limit: Option<usize>,
    #[serde(rename = "_page")]
    page: Option<usize>,
}

#[derive(Default)]
struct Store {
    posts: HashMap<u64, Post>,
    next_id: u64,
}

#[derive(Clone)]
struct AppState {
    db: Arc<RwLock<Store>>,
    /// Remaining 503s the stutter route will serve before succeeding.
    stutter: Arc<AtomicU32>,
}

/// Build the app with an empty store and a non-stuttering stutter route.
pub fn app() -> Router {
    app_with_stutter(0)
}

/// Build the app with `/stutter` failing `fails` times before succeeding.
pub fn app_with_stutter(fails: u32) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        stutter: Arc::new(AtomicU32::new(fails)),
    };
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/ping", get(ping))
        .route("/stutter", get(stutter))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve with the stutter route preloaded to fail `fails` times.
pub async fn run_with_stutter(listener: TcpListener, fails: u32) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_stutter(fails)).await
}

async fn list_posts(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<Post>> {
    let store = state.db.read().await;
    let mut posts: Vec<Post> = store.posts.values().cloned().collect();
    posts.sort_by_key(|p| p.id);

    if let Some(limit) = query.limit {
        let page = query.page.unwrap_or(1).max(1);
        posts = posts.into_iter().skip((page - 1) * limit).take(limit).collect();
    }
    Json(posts)
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let mut store = state.db.write().await;
    store.next_id += 1;
    let post = Post {
        id: store.next_id,
        title: input.title,
        body: input.body,
        user_id: input.user_id,
    };
    store.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, StatusCode> {
    let store = state.db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = state.db.write().await;
    store.posts.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

async fn ping() -> &'static str {
    "pong"
}

async fn stutter(State(state): State<AppState>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let remaining =
        state
            .stutter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    match remaining {
        Ok(_) => Err((StatusCode::SERVICE_UNAVAILABLE, "stutter".to_string())),
        Err(_) => Ok(Json(serde_json::json!({"ok": true}))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_with_camel_case_user_id() {
        let post = Post {
            id: 1,
            title: "t".to_string(),
            body: "b".to_string(),
            user_id: 9,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userId"], 9);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn post_roundtrips_through_json() {
        let post = Post {
            id: 3,
            title: "Roundtrip".to_string(),
            body: "content".to_string(),
            user_id: 2,
        };
        let json = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn create_post_rejects_missing_title() {
        let result: Result<CreatePost, _> =
            serde_json::from_str(r#"{"body":"b","userId":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn list_query_field_names_match_wire_format() {
        let query: ListQuery = serde_json::from_str(r#"{"_limit":10,"_page":2}"#).unwrap();
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.page, Some(2));
    }
}
