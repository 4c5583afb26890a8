//! End-to-end flow over the HTTP surface: ingest, aggregate, prune

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use wxp_db::DbClient;
use wxp_pipeline::WeatherPipeline;
use wxp_upstream::SimulatedProvider;

async fn test_app() -> axum::Router {
    let db = DbClient::in_memory().await.unwrap();
    let pipeline = WeatherPipeline::new(Arc::new(SimulatedProvider::new(99)), db);
    let (app, _state) = wxp_server::build_app(pipeline);
    app
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn full_pipeline_flow() {
    let app = test_app().await;

    // Ingest one day of simulated forecast data
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/ingest")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "latitude": 51.5074,
                        "longitude": -0.1278,
                        "hours": 24
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ingest = body_json(res).await;
    assert_eq!(ingest["normalized"], 24);

    // Statistics become available and report the full window
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/statistics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stats = body_json(res).await;
    assert_eq!(stats["status"], "ready");
    assert_eq!(stats["count"], 24);
    assert!(stats["temperature"]["mean"].is_number());
    assert!(stats["rainfall"]["total"].is_number());

    // Pattern analysis has enough points after one ingest
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/analytics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let analytics = body_json(res).await;
    assert_eq!(analytics["status"], "ready");
    assert_eq!(analytics["points_analyzed"], 24);
    let direction = analytics["trends"]["temperature"]["direction"]
        .as_str()
        .unwrap();
    assert!(["increasing", "decreasing", "stable"].contains(&direction));

    // Summary reflects the stored rows
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let summary = body_json(res).await;
    assert_eq!(summary["total_points"], 24);

    // Everything ingested is current or future, so pruning removes nothing
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/retention/7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let pruned = body_json(res).await;
    assert_eq!(pruned["deleted_records"], 0);
}
