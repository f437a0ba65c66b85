use crate::error::panic_response;
use crate::{ApiError, AppState};
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pulse_core::{HealthReport, Sample};
use serde::Serialize;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<Sample>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/analyze", get(analyze))
        .route("/history", get(history))
        .route("/report.pdf", get(report_pdf))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
}

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Turns handler panics into a 500 with a JSON `error` body.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(state.dashboard().to_string())
}

async fn analyze(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
    let report = state.assembler.assemble()?;
    tracing::debug!(
        report_id = %report.report_id,
        health = report.health_score,
        samples = report.history_snapshot.len(),
        "report assembled"
    );
    Ok(Json(report))
}

async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: state.history.snapshot(),
    })
}

async fn report_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.assembler.assemble()?;
    let pdf = pulse_renderer::render_report_pdf(&report);
    let headers = [
        (CONTENT_TYPE, "application/pdf".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"health-report-{}.pdf\"", report.report_id),
        ),
    ];
    Ok((headers, pdf))
}

async fn healthz() -> &'static str {
    "ok"
}
