//! Integration tests for the progression endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use uuid::Uuid;

use storyweave_test_support::{InMemorySaveRepository, InMemoryStoryGraph};

struct Fixture {
    graph: Arc<InMemoryStoryGraph>,
    saves: Arc<InMemorySaveRepository>,
    story_id: Uuid,
    n1: Uuid,
    n2: Uuid,
    c1: Uuid,
}

/// Seeds one playable story: N1 --C1--> N2, with N2 terminal.
fn fixture() -> Fixture {
    let graph = InMemoryStoryGraph::new();
    let story = graph.add_story("The Hollow Lighthouse");
    let n1 = graph.add_node(story.id, "You stand at the shore.");
    let n2 = graph.add_node(story.id, "The stairs creak underfoot.");
    graph.set_first_node(story.id, n1.id);
    let c1 = graph.add_choice(n1.id, "Climb the lighthouse", n2.id);
    Fixture {
        graph: Arc::new(graph),
        saves: Arc::new(InMemorySaveRepository::new()),
        story_id: story.id,
        n1: n1.id,
        n2: n2.id,
        c1: c1.id,
    }
}

fn app(fx: &Fixture) -> axum::Router {
    common::build_test_app(Arc::clone(&fx.graph), Arc::clone(&fx.saves))
}

#[tokio::test]
async fn test_full_playthrough_round_trip() {
    let fx = fixture();

    // Start the story: the cursor lands on the entry node.
    let (status, json) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/start", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["save"]["current_node_id"], fx.n1.to_string());
    let save_id = json["save"]["id"].as_str().unwrap().to_owned();

    // The current node carries its outgoing choices.
    let (status, json) = common::get_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/current-node", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["id"], fx.n1.to_string());
    assert_eq!(json["choices"].as_array().unwrap().len(), 1);

    // Apply the choice: order 1, cursor moves to N2.
    let (status, json) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/choice/{}", fx.story_id, fx.c1),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"], 1);
    assert_eq!(json["save_id"], save_id);
    assert_eq!(json["current_node_id"], fx.n2.to_string());

    // The cursor is durable across requests.
    let (status, json) = common::get_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/current-node", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["id"], fx.n2.to_string());
    assert!(json["choices"].as_array().unwrap().is_empty());

    // Restart: cursor returns to the entry node, history survives.
    let (status, json) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/start", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["save"]["id"], save_id);
    assert_eq!(json["save"]["current_node_id"], fx.n1.to_string());

    let (status, json) =
        common::get_as(app(&fx), "player-1", "/api/v1/stories/player/history").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    let choices = entries[0]["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0]["order"], 1);
    assert_eq!(choices[0]["text"], "Climb the lighthouse");

    // Progress summary reflects the restarted cursor and the kept log.
    let (status, json) =
        common::get_as(app(&fx), "player-1", "/api/v1/stories/player/progress").await;
    assert_eq!(status, StatusCode::OK);
    let progress = json.as_array().unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["current_node_id"], fx.n1.to_string());
    assert_eq!(progress[0]["choices_count"], 1);

    // The story shows up among active games.
    let (status, json) =
        common::get_as(app(&fx), "player-1", "/api/v1/stories/games/active").await;
    assert_eq!(status, StatusCode::OK);
    let games = json.as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["story"]["title"], "The Hollow Lighthouse");
}

#[tokio::test]
async fn test_players_hold_independent_cursors() {
    let fx = fixture();

    let (status, _) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/start", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = common::post_as(
        app(&fx),
        "player-2",
        &format!("/api/v1/stories/{}/start", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // player-1 advances; player-2 stays on the entry node.
    let (status, _) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/choice/{}", fx.story_id, fx.c1),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = common::get_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/current-node", fx.story_id),
    )
    .await;
    assert_eq!(json["node"]["id"], fx.n2.to_string());

    let (_, json) = common::get_as(
        app(&fx),
        "player-2",
        &format!("/api/v1/stories/{}/current-node", fx.story_id),
    )
    .await;
    assert_eq!(json["node"]["id"], fx.n1.to_string());
}

#[tokio::test]
async fn test_unknown_choice_returns_404() {
    let fx = fixture();

    let (status, _) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/start", fx.story_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = common::post_as(
        app(&fx),
        "player-1",
        &format!("/api/v1/stories/{}/choice/{}", fx.story_id, Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "choice_not_found");
}

#[tokio::test]
async fn test_health_endpoint_reports_ok() {
    let fx = fixture();

    let (status, json) = common::get_as(app(&fx), "player-1", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
