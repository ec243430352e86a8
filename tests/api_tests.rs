
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use roster_lite::api::{router, ApiState, HEALTH_PATH, SCHEDULE_TABLE_PATH};
use roster_lite::cache::ScheduleCache;
use roster_lite::roster::{Assignment, Worker};
use roster_lite::service::ScheduleService;
use roster_lite::source::{DataSource, FixtureSource, InMemorySource, Snapshot};
use test_harness::{fixture_dir, sample_snapshot};

fn create_test_app(source: Arc<dyn DataSource>) -> Router {
    let service = Arc::new(ScheduleService::new(source, ScheduleCache::default()));
    router(ApiState { service }, &[])
}

fn in_memory_app(snapshot: Snapshot) -> Router {
    create_test_app(Arc::new(InMemorySource::new(snapshot)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, content_type, json)
}

#[tokio::test]
async fn test_schedule_table_success() {
    let app = in_memory_app(sample_snapshot());
    let (status, _, json) = get(app, SCHEDULE_TABLE_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], json!(["Name", "15 Jan 25", "16 Jan 25"]));
    assert_eq!(
        json["rows"],
        json!([
            ["Manager", 4, 0],
            ["Alice", 4, 0],
            ["Developer", 6, 3],
            ["Bob", 6, 0],
            ["Carol", 0, 3],
        ])
    );
}

#[tokio::test]
async fn test_schedule_table_returns_json() {
    let app = in_memory_app(sample_snapshot());
    let (_, content_type, _) = get(app, SCHEDULE_TABLE_PATH).await;
    assert!(content_type.unwrap_or_default().contains("application/json"));
}

#[tokio::test]
async fn test_schedule_table_empty_input() {
    let app = in_memory_app(Snapshot::empty());
    let (status, _, json) = get(app, SCHEDULE_TABLE_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"], json!([]));
    assert_eq!(json["rows"], json!([]));
}

#[tokio::test]
async fn test_schedule_table_from_fixture_files() {
    let dir = fixture_dir(&sample_snapshot());
    let app = create_test_app(Arc::new(FixtureSource::new(dir.path())));
    let (status, _, json) = get(app, SCHEDULE_TABLE_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["columns"][0], "Name");
    assert_eq!(json["rows"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_schedule_table_data_load_error() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(Arc::new(FixtureSource::new(dir.path())));
    let (status, content_type, json) = get(app, SCHEDULE_TABLE_PATH).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.unwrap_or_default().contains("application/json"));
    assert_eq!(json["code"], "DATA_LOAD_ERROR");
    assert_eq!(json["error"], "Failed to load data from JSON files");
    assert!(json["detail"].as_str().unwrap().contains("positions.json"));
}

#[tokio::test]
async fn test_schedule_table_processing_error() {
    let (positions, workers, tasks, mut assignments) = sample_snapshot().into_parts();
    assignments.push(Assignment::new(1, 404));
    let app = in_memory_app(Snapshot::new(positions, workers, tasks, assignments));

    let (status, _, json) = get(app, SCHEDULE_TABLE_PATH).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "PROCESSING_ERROR");
    assert_eq!(json["error"], "Failed to process schedule data");
    assert!(json["detail"].as_str().unwrap().contains("missing task 404"));
}

#[tokio::test]
async fn test_schedule_table_null_position_row() {
    let (positions, mut workers, tasks, assignments) = sample_snapshot().into_parts();
    workers.push(Worker::new(9, "Unassigned Worker", None));
    let app = in_memory_app(Snapshot::new(positions, workers, tasks, assignments));

    let (status, _, json) = get(app, SCHEDULE_TABLE_PATH).await;
    assert_eq!(status, StatusCode::OK);

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows[rows.len() - 2], json!(["Empty Position", 0, 0]));
    assert_eq!(rows[rows.len() - 1], json!(["Unassigned Worker", 0, 0]));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = in_memory_app(Snapshot::empty());
    let (status, _, json) = get(app, HEALTH_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = in_memory_app(Snapshot::empty());
    let response = app
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
