//! Integration tests for the HTTP API over the in-memory repository.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For `oneshot` method

use poomsae_tournament::TournamentManager;
use poomsae_tournament::db::MemoryRepository;
use pt_server::api::{AppState, create_router};

/// Test server backed by in-memory storage
fn create_test_server() -> Router {
    let manager = Arc::new(TournamentManager::new(Arc::new(MemoryRepository::new())));
    create_router(AppState {
        manager,
        database: None,
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn spring_open() -> Value {
    json!({"name": "Spring Open", "tournament_start": "2026-04-18T09:00:00Z"})
}

fn solo(name: &str, belt_grade: &str, sex: &str) -> Value {
    json!({"participants": [
        {"name": name, "belt_grade": belt_grade, "sex": sex, "birthdate": "2002-07-01"}
    ]})
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_server();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_responses_carry_a_request_id() {
    let app = create_test_server();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_create_and_list_tournaments() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["name"], "Spring Open");

    let response = app.oneshot(get("/api/v1/tournaments")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_get_unknown_tournament_is_404() {
    let app = create_test_server();

    let response = app.oneshot(get("/api/v1/tournaments/99")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_make_pools_for_unknown_tournament_is_404() {
    let app = create_test_server();

    let response = app
        .oneshot(post_empty("/api/v1/tournaments/99/make_pools"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_and_pool_build_flow() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    let tournament = json_body(response).await;
    let tournament_id = tournament["id"].as_i64().unwrap();

    // Three solos: two female beginners, one male Dan holder.
    for (name, grade, sex) in [("Ari", "WH", "F"), ("Bo", "WY", "F"), ("Chul", "1D", "M")] {
        let response = app
            .clone()
            .oneshot(post(
                &format!("/api/v1/tournaments/{tournament_id}/teams"),
                solo(name, grade, sex),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(post_empty(&format!(
            "/api/v1/tournaments/{tournament_id}/make_pools"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = json_body(response).await;

    // D-class female solo pool with two teams, A-class male solo pool
    // with one.
    let pools = detail["pools"].as_array().unwrap();
    assert_eq!(pools.len(), 2);
    let mut sizes: Vec<usize> = pools
        .iter()
        .map(|pool| pool["team_ids"].as_array().unwrap().len())
        .collect();
    sizes.sort();
    assert_eq!(sizes, vec![1, 2]);
    for pool in pools {
        assert_eq!(pool["pool_type"], "S");
    }
    for team in detail["teams"].as_array().unwrap() {
        assert!(team["pool_id"].is_i64());
    }
}

#[tokio::test]
async fn test_pair_team_lands_in_shared_pair_pool() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    let tournament_id = json_body(response).await["id"].as_i64().unwrap();

    let pair = json!({"participants": [
        {"name": "Dana", "belt_grade": "BL", "sex": "F", "birthdate": "2001-01-15"},
        {"name": "Eun", "belt_grade": "RE", "sex": "M", "birthdate": "2000-09-23"}
    ]});
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/v1/tournaments/{tournament_id}/teams"),
            pair,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_empty(&format!(
            "/api/v1/tournaments/{tournament_id}/make_pools"
        )))
        .await
        .unwrap();
    let detail = json_body(response).await;

    let pools = detail["pools"].as_array().unwrap();
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0]["pool_type"], "P");
}

#[tokio::test]
async fn test_unknown_belt_grade_is_rejected_at_registration() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    let tournament_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post(
            &format!("/api/v1/tournaments/{tournament_id}/teams"),
            solo("Typo", "ZZ", "F"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("ZZ"));
}

#[tokio::test]
async fn test_invalid_sex_code_is_rejected_by_deserialization() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    let tournament_id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post(
            &format!("/api/v1/tournaments/{tournament_id}/teams"),
            solo("Quinn", "WH", "Q"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_empty_team_aborts_build_and_preserves_pools() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(post("/api/v1/tournaments", spring_open()))
        .await
        .unwrap();
    let tournament_id = json_body(response).await["id"].as_i64().unwrap();

    app.clone()
        .oneshot(post(
            &format!("/api/v1/tournaments/{tournament_id}/teams"),
            solo("Ari", "GR", "F"),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_empty(&format!(
            "/api/v1/tournaments/{tournament_id}/make_pools"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let before = json_body(response).await["pools"].clone();

    // An empty registration poisons the next build.
    app.clone()
        .oneshot(post(
            &format!("/api/v1/tournaments/{tournament_id}/teams"),
            json!({"participants": []}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_empty(&format!(
            "/api/v1/tournaments/{tournament_id}/make_pools"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("no participants"));

    // The failed build changed nothing.
    let response = app
        .oneshot(get(&format!("/api/v1/tournaments/{tournament_id}")))
        .await
        .unwrap();
    let after = json_body(response).await["pools"].clone();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_add_participant_to_unknown_team_is_404() {
    let app = create_test_server();

    let response = app
        .oneshot(post(
            "/api/v1/teams/123/participants",
            json!({"name": "Nobody", "belt_grade": "WH", "sex": "M", "birthdate": "1999-12-31"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
