use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{ChildId, Score};
use super::evaluation::RuleConfig;
use super::repository::{ChildRepository, SettingsRepository};
use super::roster::{EvaluationBatch, RosterError, RosterQuery};
use super::service::{ProgressService, ProgressServiceError};
use super::stats::views::{ChildStatsView, LegacyStatsView};

/// Router builder exposing the evaluation, roster, and reporting endpoints.
pub fn progress_router<C, S>(service: Arc<ProgressService<C, S>>) -> Router
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    Router::new()
        .route("/api/v1/evaluate", post(evaluate_handler::<C, S>))
        .route(
            "/api/v1/settings",
            get(settings_handler::<C, S>).put(update_settings_handler::<C, S>),
        )
        .route(
            "/api/v1/children",
            get(roster_handler::<C, S>).post(add_child_handler::<C, S>),
        )
        .route(
            "/api/v1/children/:child_id/archive",
            post(archive_handler::<C, S>),
        )
        .route(
            "/api/v1/children/:child_id/stats",
            get(child_stats_handler::<C, S>),
        )
        .route("/api/v1/evaluations", post(record_handler::<C, S>))
        .route("/api/v1/reports/cohort", get(cohort_handler::<C, S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    pub scores: Vec<Score>,
    #[serde(default)]
    pub config: Option<RuleConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewChildRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default)]
    pub legacy: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CohortQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Serialize)]
struct ChildStatsResponse {
    id: ChildId,
    name: String,
    archived: bool,
    stats: ChildStatsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    legacy: Option<LegacyStatsView>,
}

fn error_response(error: ProgressServiceError) -> Response {
    let status = match &error {
        ProgressServiceError::Settings(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProgressServiceError::Roster(RosterError::UnknownChild(_)) => StatusCode::NOT_FOUND,
        ProgressServiceError::Roster(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProgressServiceError::Repository(_) => {
            warn!(error = %error, "progress repository failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.evaluate_scores(&request.scores, request.config) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn settings_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.settings() {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_settings_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    axum::Json(config): axum::Json<RuleConfig>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.update_settings(config) {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn roster_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    Query(query): Query<RosterQuery>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.roster(&query) {
        Ok(children) => (StatusCode::OK, axum::Json(children)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_child_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    axum::Json(request): axum::Json<NewChildRequest>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.add_child(&request.name) {
        Ok(child) => (StatusCode::CREATED, axum::Json(child)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn archive_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    Path(child_id): Path<String>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.archive_child(&ChildId(child_id)) {
        Ok(child) => (StatusCode::OK, axum::Json(child)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn child_stats_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    Path(child_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.child_stats(&ChildId(child_id)) {
        Ok((child, stats)) => {
            let legacy = query.legacy.then(|| LegacyStatsView::new(&child, &stats));
            let body = ChildStatsResponse {
                stats: ChildStatsView::from(&stats),
                id: child.id,
                name: child.name,
                archived: child.archived,
                legacy,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    axum::Json(batch): axum::Json<EvaluationBatch>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.record_evaluations(&batch) {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cohort_handler<C, S>(
    State(service): State<Arc<ProgressService<C, S>>>,
    Query(query): Query<CohortQuery>,
) -> Response
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    match service.cohort_report(query.include_archived) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
