//! HTTP request handlers for the pay log API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! request is tagged with a correlation id that appears on each log line
//! the request produces.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{ViewKind, parse_calendar_date};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayRate, WorkEntry};

use super::request::{ActualPayRequest, DateQuery, EntryRequest, IdQuery, RateRequest, ViewQuery};
use super::response::{ApiError, ApiErrorResponse, EntriesResponse, HealthResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/current-period", get(current_period_handler))
        .route(
            "/entries",
            get(list_entries_handler)
                .post(create_entry_handler)
                .put(update_entry_handler)
                .delete(delete_entry_handler),
        )
        .route("/totals", get(totals_handler))
        .route("/rates", post(add_rate_handler))
        .route("/periods", get(periods_handler))
        .route("/periods/:id/refresh", post(refresh_earnings_handler))
        .route("/periods/:id/actual-pay", post(actual_pay_handler))
        .with_state(state)
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.with_ledger(|ledger| Ok(ledger.store().ping()?)).await {
        Ok(()) => json_response(
            StatusCode::OK,
            HealthResponse {
                status: "ok".to_string(),
            },
        ),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /current-period.
///
/// Resolves (creating if needed) the period containing `date` and returns it
/// with its totals.
async fn current_period_handler(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    let date = match date_or_today(query.date.as_deref()) {
        Ok(date) => date,
        Err(err) => return engine_error(correlation_id, err),
    };

    let start_time = Instant::now();
    match state
        .with_ledger(move |ledger| ledger.period_summary(date))
        .await
    {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                period_id = summary.period.id,
                start = %summary.period.start_date,
                end = %summary.period.end_date,
                total_gross = summary.totals.total_gross,
                duration_us = start_time.elapsed().as_micros(),
                "Current period retrieved"
            );
            json_response(StatusCode::OK, summary)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /entries.
async fn list_entries_handler(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    let (view, date) = match parse_view_query(&query) {
        Ok(parsed) => parsed,
        Err(err) => return engine_error(correlation_id, err),
    };

    let result = state
        .with_ledger(move |ledger| ledger.entries_for_view(view, date))
        .await;

    match result {
        Ok(entries) => {
            let body = EntriesResponse {
                view,
                date,
                entries,
            };
            info!(
                correlation_id = %correlation_id,
                view = ?body.view,
                date = %body.date,
                count = body.entries.len(),
                "Entries listed"
            );
            json_response(StatusCode::OK, body)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /totals.
async fn totals_handler(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    let (view, date) = match parse_view_query(&query) {
        Ok(parsed) => parsed,
        Err(err) => return engine_error(correlation_id, err),
    };

    match state
        .with_ledger(move |ledger| ledger.view_totals(view, date))
        .await
    {
        Ok(totals) => {
            info!(
                correlation_id = %correlation_id,
                total_hours = totals.total_hours,
                total_gross = totals.total_gross,
                "Totals computed"
            );
            json_response(StatusCode::OK, totals)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /entries.
async fn create_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let entry: WorkEntry = match payload {
        Ok(Json(request)) => request.into(),
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    match state
        .with_ledger(move |ledger| ledger.record_entry(entry))
        .await
    {
        Ok(stored) => {
            info!(
                correlation_id = %correlation_id,
                entry_id = stored.id,
                kind = %stored.kind,
                date = %stored.date,
                "Entry recorded"
            );
            json_response(StatusCode::CREATED, stored)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for PUT /entries.
async fn update_entry_handler(
    State(state): State<AppState>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };
    if request.id.is_none() {
        return rejected(correlation_id, ApiError::missing_field("id"));
    }

    match state
        .with_ledger(move |ledger| ledger.update_entry(request.into()))
        .await
    {
        Ok(updated) => {
            info!(correlation_id = %correlation_id, entry_id = updated.id, "Entry updated");
            json_response(StatusCode::OK, updated)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for DELETE /entries?id=.
async fn delete_entry_handler(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match query {
        Ok(Query(query)) => query.id,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    match state.with_ledger(move |ledger| ledger.delete_entry(id)).await {
        Ok(()) => {
            info!(correlation_id = %correlation_id, entry_id = id, "Entry deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /rates.
async fn add_rate_handler(
    State(state): State<AppState>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let rate: PayRate = match payload {
        Ok(Json(request)) => request.into(),
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    match state.with_ledger(move |ledger| ledger.add_rate(rate)).await {
        Ok(stored) => {
            info!(
                correlation_id = %correlation_id,
                effective_date = %stored.effective_date,
                "Rate added"
            );
            json_response(StatusCode::CREATED, stored)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /periods.
///
/// Lists every stored period, oldest first. Exactly one carries the
/// `current` status once any period has been resolved.
async fn periods_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();

    match state.with_ledger(|ledger| ledger.periods()).await {
        Ok(periods) => {
            info!(
                correlation_id = %correlation_id,
                count = periods.len(),
                "Periods listed"
            );
            json_response(StatusCode::OK, periods)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /periods/{id}/refresh.
async fn refresh_earnings_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            return rejected(correlation_id, ApiError::validation_error(rejection.body_text()));
        }
    };

    match state
        .with_ledger(move |ledger| ledger.refresh_earnings(id))
        .await
    {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /periods/{id}/actual-pay.
async fn actual_pay_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ActualPayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            return rejected(correlation_id, ApiError::validation_error(rejection.body_text()));
        }
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejected(correlation_id, rejection.into()),
    };

    match state
        .with_ledger(move |ledger| {
            ledger.record_actual_pay(id, request.gross_actual, request.net_actual)
        })
        .await
    {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => engine_error(correlation_id, err),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `date`, falling back to local today when it is absent or blank.
fn date_or_today(date: Option<&str>) -> EngineResult<NaiveDate> {
    match date {
        Some(raw) if !raw.trim().is_empty() => parse_calendar_date(raw),
        _ => Ok(today()),
    }
}

fn parse_view_query(query: &ViewQuery) -> EngineResult<(ViewKind, NaiveDate)> {
    let view = match query.view.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse()?,
        _ => ViewKind::default(),
    };
    Ok((view, date_or_today(query.date.as_deref())?))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn rejected(correlation_id: Uuid, error: ApiError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        code = %error.code,
        error = %error.message,
        "Request rejected"
    );
    ApiErrorResponse::bad_request(error).into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    if err.is_validation() || err.is_not_found() {
        warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    } else {
        error!(correlation_id = %correlation_id, error = %err, "Request failed");
    }
    ApiErrorResponse::from(err).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::default_anchor;
    use crate::ledger::PayLedger;
    use crate::store::SqliteStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(PayLedger::new(
            SqliteStore::open_in_memory().unwrap(),
            default_anchor(),
        ))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_date_or_today() {
        assert_eq!(
            date_or_today(Some("2025-01-20")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
        );
        assert_eq!(date_or_today(None).unwrap(), today());
        assert_eq!(date_or_today(Some("  ")).unwrap(), today());
        assert!(date_or_today(Some("20/01/2025")).is_err());
    }

    #[test]
    fn test_parse_view_query_defaults_to_period() {
        let (view, _) = parse_view_query(&ViewQuery::default()).unwrap();
        assert_eq!(view, ViewKind::Period);

        let bad = ViewQuery {
            view: Some("month".to_string()),
            date: None,
        };
        assert!(matches!(
            parse_view_query(&bad),
            Err(EngineError::InvalidView { .. })
        ));
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_invalid_date_returns_400() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/current-period?date=2025-02-30")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "INVALID_DATE");
    }

    #[tokio::test]
    async fn test_update_without_id_returns_400() {
        let router = create_router(create_test_state());
        let body = r#"{"type": "flight", "date": "2025-01-08", "time": "09:00"}"#;
        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/entries")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "MISSING_FIELD");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rates")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_extended_year_returns_400_and_server_keeps_serving() {
        let router = create_router(create_test_state());
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/totals?view=week&date=%2B262142-12-31")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.code, "INVALID_DATE");

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_periods_empty_store_returns_empty_list() {
        let router = create_router(create_test_state());
        let response = router
            .oneshot(Request::builder().uri("/periods").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }
}
