//! REST API server for the transaction insights engine
//!
//! Maps the HTTP surface onto the engine: bounded queries, filtered queries,
//! insights, and the two AI-assisted endpoints. Credential validation happens
//! here, at the boundary; the engine below never sees a key it must hold.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::FinsightError;
use crate::filter::QuerySpec;
use crate::insights;
use crate::models::{InsightsSummary, Transaction};
use crate::openai::OpenAiClient;
use crate::prompt::{self, QUESTION_CONTEXT_ROWS, REPORT_CONTEXT_ROWS};
use crate::store::TransactionStore;

/// =============================
/// Route Bounds
/// =============================

const LIST_DEFAULT_LIMIT: u32 = 10;
const LIST_MAX_LIMIT: u32 = 200;

const FILTER_DEFAULT_LIMIT: u32 = 50;
const FILTER_MAX_LIMIT: u32 = 500;

/// Rows aggregated for every insights computation.
const INSIGHTS_WINDOW_ROWS: u32 = 1_000;

const REPORT_DEFAULT_LIMIT: u32 = 200;

/// Rows retrieved for question context before the 30-row prompt truncation.
const QUESTION_SOURCE_ROWS: u32 = 200;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default = "default_report_limit")]
    pub limit: u32,
    pub api_key: Option<String>,
}

fn default_report_limit() -> u32 {
    REPORT_DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
    pub api_key: Option<String>,
}

/// =============================
/// Error Translation
/// =============================

/// Caller-visible failure: machine-readable kind plus human-readable cause.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn error_response(err: FinsightError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        FinsightError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        FinsightError::EmptySample | FinsightError::NoExpenses => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FinsightError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        FinsightError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorBody {
            error: err.kind(),
            detail: err.to_string(),
        }),
    )
}

/// =============================
/// Validation Helpers
/// =============================

fn route_limit(requested: Option<u32>, default: u32, max: u32) -> crate::Result<u32> {
    let limit = requested.unwrap_or(default);
    if limit == 0 || limit > max {
        return Err(FinsightError::InvalidArgument(format!(
            "limit must be between 1 and {}, got {}",
            max, limit
        )));
    }
    Ok(limit)
}

/// Credential shape check. The key is a per-request value, forwarded to the
/// provider client and dropped with the request.
fn validate_api_key(key: Option<&str>) -> crate::Result<&str> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() && key.starts_with("sk-") => Ok(key),
        _ => Err(FinsightError::InvalidArgument(
            "missing or invalid provider API key".to_string(),
        )),
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn TransactionStore>,
}

/// =============================
/// Handlers
/// =============================

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "finsight API is running!" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_transactions(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Transaction>> {
    let limit = route_limit(params.limit, LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT)
        .map_err(error_response)?;

    let rows = state.store.fetch(limit).await.map_err(error_response)?;
    Ok(Json(rows))
}

async fn filter_transactions(
    State(state): State<ApiState>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Vec<Transaction>> {
    let limit = route_limit(params.limit, FILTER_DEFAULT_LIMIT, FILTER_MAX_LIMIT)
        .map_err(error_response)?;

    let spec = QuerySpec::build(params.category.as_deref(), params.merchant.as_deref(), limit)
        .map_err(error_response)?;

    let rows = state
        .store
        .fetch_filtered(&spec)
        .await
        .map_err(error_response)?;
    Ok(Json(rows))
}

async fn get_insights(State(state): State<ApiState>) -> ApiResult<InsightsSummary> {
    let window = state
        .store
        .fetch(INSIGHTS_WINDOW_ROWS)
        .await
        .map_err(error_response)?;

    let summary = insights::compute(&window).map_err(error_response)?;
    Ok(Json(summary))
}

async fn ai_report(
    State(state): State<ApiState>,
    Json(req): Json<ReportRequest>,
) -> ApiResult<serde_json::Value> {
    let api_key = validate_api_key(req.api_key.as_deref()).map_err(error_response)?;
    let limit = route_limit(Some(req.limit), REPORT_DEFAULT_LIMIT, FILTER_MAX_LIMIT)
        .map_err(error_response)?;

    info!("AI report requested over {} rows", limit);

    let sample = state.store.fetch(limit).await.map_err(error_response)?;
    let window = state
        .store
        .fetch(INSIGHTS_WINDOW_ROWS)
        .await
        .map_err(error_response)?;
    let summary = insights::compute(&window).map_err(error_response)?;

    let payload = prompt::compose_report_prompt(&summary, &sample, REPORT_CONTEXT_ROWS)
        .map_err(error_response)?;

    let report = OpenAiClient::new(api_key.to_string())
        .complete(&payload)
        .await
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({ "report": report })))
}

async fn ai_question(
    State(state): State<ApiState>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<serde_json::Value> {
    let api_key = validate_api_key(req.api_key.as_deref()).map_err(error_response)?;

    info!("AI question received");

    let sample = state
        .store
        .fetch(QUESTION_SOURCE_ROWS)
        .await
        .map_err(error_response)?;

    let payload = prompt::compose_question_prompt(&req.question, &sample, QUESTION_CONTEXT_ROWS)
        .map_err(error_response)?;

    let answer = OpenAiClient::new(api_key.to_string())
        .complete(&payload)
        .await
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({ "answer": answer })))
}

/// =============================
/// Router
/// =============================

pub fn create_router(store: Arc<dyn TransactionStore>) -> Router {
    let state = ApiState { store };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/transactions", get(list_transactions))
        .route("/transactions/filter", get(filter_transactions))
        .route("/insights", get(get_insights))
        .route("/ai/report", post(ai_report))
        .route("/ai/question", post(ai_question))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    store: Arc<dyn TransactionStore>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn tx(i: u32, amount: f64, category: Category) -> Transaction {
        Transaction {
            id: format!("tx-{}", i),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            description: "test".into(),
            amount,
            currency: "EUR".into(),
            merchant: "Amazon".into(),
            category,
            city: "Berlin".into(),
            country: "Germany".into(),
        }
    }

    fn seeded_state() -> ApiState {
        let rows = vec![
            tx(0, 900.0, Category::Income),
            tx(1, -25.0, Category::Food),
            tx(2, -75.0, Category::Shopping),
        ];
        ApiState {
            store: Arc::new(MemoryStore::new(rows)),
        }
    }

    #[tokio::test]
    async fn test_list_rejects_out_of_bound_limit() {
        let state = seeded_state();

        let (status, Json(body)) =
            list_transactions(State(state.clone()), Query(ListParams { limit: Some(0) }))
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "invalid_argument");

        let err = list_transactions(
            State(state),
            Query(ListParams {
                limit: Some(LIST_MAX_LIMIT + 1),
            }),
        )
        .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_list_defaults_and_returns_rows() {
        let state = seeded_state();
        let Json(rows) = list_transactions(State(state), Query(ListParams { limit: None }))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_filter_route() {
        let state = seeded_state();
        let Json(rows) = filter_transactions(
            State(state),
            Query(FilterParams {
                category: Some("food".into()),
                merchant: None,
                limit: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, Category::Food);
    }

    #[tokio::test]
    async fn test_insights_route() {
        let state = seeded_state();
        let Json(summary) = get_insights(State(state)).await.unwrap();
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.total_income, 900.0);
        assert_eq!(summary.total_spent, -100.0);
    }

    #[tokio::test]
    async fn test_insights_on_empty_store_is_422() {
        let state = ApiState {
            store: Arc::new(MemoryStore::empty()),
        };
        let (status, Json(body)) = get_insights(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "empty_sample");
    }

    #[tokio::test]
    async fn test_ai_report_rejects_bad_credentials() {
        let state = seeded_state();

        for api_key in [None, Some(String::new()), Some("not-a-key".to_string())] {
            let (status, Json(body)) = ai_report(
                State(state.clone()),
                Json(ReportRequest {
                    limit: REPORT_DEFAULT_LIMIT,
                    api_key,
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.error, "invalid_argument");
        }
    }

    #[tokio::test]
    async fn test_ai_question_rejects_empty_question_before_provider_call() {
        let state = seeded_state();
        let (status, Json(body)) = ai_question(
            State(state),
            Json(QuestionRequest {
                question: "   ".into(),
                api_key: Some("sk-test".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "invalid_argument");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (FinsightError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (FinsightError::EmptySample, StatusCode::UNPROCESSABLE_ENTITY),
            (FinsightError::NoExpenses, StatusCode::UNPROCESSABLE_ENTITY),
            (FinsightError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (FinsightError::UpstreamFailure("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            let (status, _) = error_response(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_api_key_shape() {
        assert!(validate_api_key(Some("sk-abc123")).is_ok());
        assert!(validate_api_key(Some("  sk-abc123  ")).is_ok());
        assert!(validate_api_key(Some("abc")).is_err());
        assert!(validate_api_key(Some("")).is_err());
        assert!(validate_api_key(None).is_err());
    }
}
