// Student Ledger - REST API
// Thin axum layer over the ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::intake::TransactionRequest;
use crate::ledger::Ledger;
use crate::transaction::Transaction;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    /// Applied to list endpoints when the request carries no `limit`
    pub default_limit: Option<usize>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            default_limit: None,
        }
    }

    pub fn with_default_limit(mut self, limit: Option<usize>) -> Self {
        self.default_limit = limit;
        self
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

impl AppState {
    fn apply_limit(&self, mut transactions: Vec<Transaction>, params: &ListParams) -> Vec<Transaction> {
        if let Some(limit) = params.limit.or(self.default_limit) {
            transactions.truncate(limit);
        }
        transactions
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /admin/transactions/add - Validate and record a transaction
async fn add_transaction(
    State(state): State<AppState>,
    Json(payload): Json<TransactionRequest>,
) -> Response {
    match payload.validate() {
        Ok(new) => {
            let tx = state.ledger.record(new);
            (StatusCode::OK, Json(ApiResponse::ok(tx))).into_response()
        }
        Err(e) => {
            info!("Rejected transaction: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// GET /admin/transactions/all - Every transaction, insertion order
async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let transactions = state.apply_limit(state.ledger.list_all(), &params);
    Json(ApiResponse::ok(transactions))
}

/// GET /admin/transactions/student/:student_id - Exact student match
async fn list_by_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let transactions = state.apply_limit(state.ledger.list_by_student(&student_id), &params);
    Json(ApiResponse::ok(transactions))
}

/// GET /admin/transactions/flagged - Anomaly feed
async fn list_flagged(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let transactions = state.apply_limit(state.ledger.list_flagged(), &params);
    Json(ApiResponse::ok(transactions))
}

/// GET /admin/transactions/stats - Totals
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.ledger.stats()))
}

/// GET /admin/transactions/:id - One transaction by identifier
async fn get_transaction(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid transaction id: {}", id),
            )
        }
    };

    match state.ledger.get(&id) {
        Some(tx) => (StatusCode::OK, Json(ApiResponse::ok(tx))).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Transaction not found: {}", id)),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(health_check));

    let transaction_routes = Router::new()
        .route("/add", post(add_transaction))
        .route("/all", get(list_all))
        .route("/flagged", get(list_flagged))
        .route("/stats", get(get_stats))
        .route("/student/:student_id", get(list_by_student))
        .route("/:id", get(get_transaction));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin/transactions", transaction_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
