use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeadId, LeadSubmission, LeadUpdate, NewPhoto, QuoteRequest, SqftOfferRequest};
use super::repository::{LeadRepository, RepositoryError};
use super::service::{LeadIntakeService, LeadServiceError, ValidationError};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

/// Router builder exposing lead intake, photo, and quote endpoints.
pub fn lead_router<R>(service: Arc<LeadIntakeService<R>>) -> Router
where
    R: LeadRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/leads",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/leads/:lead_id",
            get(detail_handler::<R>).put(update_handler::<R>),
        )
        .route("/api/v1/leads/:lead_id/photos", post(photo_handler::<R>))
        .route(
            "/api/v1/leads/:lead_id/photos/analyze",
            post(analyze_handler::<R>),
        )
        .route("/api/v1/valuations/quote", post(quote_handler::<R>))
        .route("/api/v1/valuations/sqft-offer", post(sqft_offer_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    limit: Option<usize>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn validation_response(error: ValidationError) -> Response {
    error_response(StatusCode::BAD_REQUEST, error.to_string())
}

fn service_error_response(error: LeadServiceError) -> Response {
    match error {
        LeadServiceError::Validation(error) => validation_response(error),
        LeadServiceError::Repository(RepositoryError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "lead not found".to_string())
        }
        LeadServiceError::Repository(RepositoryError::Conflict) => {
            error_response(StatusCode::CONFLICT, "lead already exists".to_string())
        }
        LeadServiceError::Repository(RepositoryError::Stale) => error_response(
            StatusCode::CONFLICT,
            "lead was edited during the request; retry".to_string(),
        ),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    axum::Json(submission): axum::Json<LeadSubmission>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.create(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.detail_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: LeadRepository + 'static,
{
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    match service.list(limit) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.summary_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn detail_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.get(&LeadId(lead_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    Path(lead_id): Path<String>,
    axum::Json(update): axum::Json<LeadUpdate>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.update(&LeadId(lead_id), update) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn photo_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    Path(lead_id): Path<String>,
    axum::Json(photo): axum::Json<NewPhoto>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.add_photo(&LeadId(lead_id), photo) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn analyze_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.analyze_photos(&LeadId(lead_id)) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn quote_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.quote(request) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => validation_response(error),
    }
}

pub(crate) async fn sqft_offer_handler<R>(
    State(service): State<Arc<LeadIntakeService<R>>>,
    axum::Json(request): axum::Json<SqftOfferRequest>,
) -> Response
where
    R: LeadRepository + 'static,
{
    match service.sqft_offer(request) {
        Ok(offer) => (StatusCode::OK, axum::Json(offer)).into_response(),
        Err(error) => validation_response(error),
    }
}
