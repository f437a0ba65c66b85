use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get as route_get;
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use pulse_core::{HealthScorer, Sample};
use pulse_server::{routes, AppState};
use pulse_system::{HistoryBuffer, HostMetadata, LocalClock, ReportAssembler};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(samples: usize) -> (Router, Arc<HistoryBuffer>) {
    let history = Arc::new(HistoryBuffer::new(50));
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
    for i in 0..samples {
        history.append(Sample::new(
            start + Duration::seconds(5 * i as i64),
            10.0,
            20.0,
            5.0,
            250,
            1.0,
            40,
            30,
        ));
    }

    let assembler = ReportAssembler::new(
        Arc::clone(&history),
        HealthScorer::default(),
        HostMetadata::collect_with(|_| None),
        LocalClock::new(330, "IST"),
    );
    let state = AppState::new(Arc::new(assembler), 5);
    (routes::router(state), history)
}

async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn analyze_returns_report() {
    let (app, _) = app(3);
    let (status, _, body) = get(app, "/analyze").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    // 100 - (10*0.35 + 20*0.35 + 5*0.2 + 1*1) = 87.5
    assert_eq!(json["health_score"], 87.5);
    assert_eq!(json["status"], "optimal");
    assert_eq!(json["status_message"], "System is performing optimally.");
    assert_eq!(json["resources"]["cpu"], 10.0);
    assert_eq!(json["deployment"]["service"], "local_service");
    assert_eq!(json["history_snapshot"].as_array().unwrap().len(), 3);
    assert_eq!(json["report_id"].as_str().unwrap().len(), 8);
    assert!(json["timestamp_local"].as_str().unwrap().ends_with("IST"));
}

#[tokio::test]
async fn analyze_before_first_sample_is_unavailable() {
    let (app, _) = app(0);
    let (status, _, body) = get(app, "/analyze").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn history_lists_samples_oldest_first() {
    let (app, history) = app(4);
    let (status, _, body) = get(app, "/history").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    let items = json["history"].as_array().unwrap();
    assert_eq!(items.len(), history.len());
    assert_eq!(items[0]["timestamp"], "2026-10-19T08:00:00Z");
    assert_eq!(items[3]["timestamp"], "2026-10-19T08:00:15Z");
}

#[tokio::test]
async fn empty_history_is_an_empty_list() {
    let (app, _) = app(0);
    let (status, _, body) = get(app, "/history").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["history"], Value::Array(vec![]));
}

#[tokio::test]
async fn pdf_export_is_an_attachment() {
    let (app, _) = app(2);
    let (status, headers, body) = get(app, "/report.pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");

    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"health-report-"));
    assert!(disposition.ends_with(".pdf\""));
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn pdf_export_without_samples_fails() {
    let (app, _) = app(0);
    let (status, _, _) = get(app, "/report.pdf").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn dashboard_is_html() {
    let (app, _) = app(0);
    let (status, headers, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("fetch(\"/analyze\""));
    assert!(html.contains("const REFRESH_MS = 5 * 1000;"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let (app, _) = app(0);
    let (status, _, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = app(0);
    let (status, _, _) = get(app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_panic_becomes_json_error() {
    let app: Router = Router::new()
        .route("/boom", route_get(|| async { panic!("disk on fire") as () }))
        .layer(routes::catch_panic_layer());

    let (status, headers, body) = get(app, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "internal error: disk on fire");
}
