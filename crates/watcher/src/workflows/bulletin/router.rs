use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::ActId;
use super::repository::{AlertFilter, AlertRepository};
use super::service::{AnalyzeRequest, BulletinService, BulletinServiceError, ClassifyRequest};

/// Router builder exposing analysis, classification and alert endpoints.
pub fn bulletin_router<R>(service: Arc<BulletinService<R>>) -> Router
where
    R: AlertRepository + 'static,
{
    Router::new()
        .route("/api/v1/bulletins/analyze", post(analyze_handler::<R>))
        .route("/api/v1/acts/classify", post(classify_handler::<R>))
        .route("/api/v1/acts/:act_id/alerts", get(act_alerts_handler::<R>))
        .route("/api/v1/alerts", get(alerts_handler::<R>))
        .route("/api/v1/catalog/programs", get(catalog_handler::<R>))
        .with_state(service)
}

pub(crate) async fn analyze_handler<R>(
    State(service): State<Arc<BulletinService<R>>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response
where
    R: AlertRepository + 'static,
{
    match service.analyze(request) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn classify_handler<R>(
    State(service): State<Arc<BulletinService<R>>>,
    axum::Json(request): axum::Json<ClassifyRequest>,
) -> Response
where
    R: AlertRepository + 'static,
{
    let act = service.classify(&request);
    (StatusCode::OK, axum::Json(json!({ "act": act }))).into_response()
}

pub(crate) async fn alerts_handler<R>(
    State(service): State<Arc<BulletinService<R>>>,
    Query(filter): Query<AlertFilter>,
) -> Response
where
    R: AlertRepository + 'static,
{
    match service.alerts(&filter) {
        Ok(alerts) => (StatusCode::OK, axum::Json(json!({ "alerts": alerts }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn act_alerts_handler<R>(
    State(service): State<Arc<BulletinService<R>>>,
    Path(act_id): Path<String>,
) -> Response
where
    R: AlertRepository + 'static,
{
    let act_id = match ActId::new(act_id) {
        Ok(id) => id,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };
    match service.alerts_for_act(&act_id) {
        Ok(alerts) => (
            StatusCode::OK,
            axum::Json(json!({ "act_id": act_id, "alerts": alerts })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn catalog_handler<R>(State(service): State<Arc<BulletinService<R>>>) -> Response
where
    R: AlertRepository + 'static,
{
    let catalog = service.catalog();
    let payload = json!({
        "summary": catalog.summary(),
        "programs": catalog.programs(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: BulletinServiceError) -> Response {
    let status = match error {
        BulletinServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BulletinServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
