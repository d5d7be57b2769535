//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use storyweave_api::routes;
use storyweave_api::state::AppState;
use storyweave_core::graph::StoryGraph;
use storyweave_core::save::SaveRepository;
use storyweave_test_support::{InMemorySaveRepository, InMemoryStoryGraph};

/// Build the full app router over in-memory collaborators. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app(graph: Arc<InMemoryStoryGraph>, saves: Arc<InMemorySaveRepository>) -> Router {
    let app_state = AppState::new(graph as Arc<dyn StoryGraph>, saves as Arc<dyn SaveRepository>);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stories", routes::stories::router())
        .with_state(app_state)
}

/// Send a POST request on behalf of `player` and return the response.
pub async fn post_as(app: Router, player: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-player-id", player)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request on behalf of `player` and return the response.
pub async fn get_as(app: Router, player: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-player-id", player)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
