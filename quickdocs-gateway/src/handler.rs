//! HTTP request handlers.
//!
//! The `/query` endpoint carries the natural-language box: translate the
//! question, execute the parameterized result, and always answer with the
//! three-field `{sql, results, error}` shape. Everything else is plain CRUD
//! over the store.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use quickdocs_core::engine::ResultRow;
use quickdocs_core::translate;

use crate::error::GatewayError;
use crate::store::{
    Customer, DashboardRow, DocumentType, PendingAssignment, Process, SubmissionOutcome,
    SubmissionView,
};
use crate::AppState;

const NOT_UNDERSTOOD: &str = "Could not understand the query. Please try rephrasing.";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Natural-language query form
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Response for the natural-language endpoint. `sql` is empty and `error`
/// explains when the question was not understood; execution failures carry
/// the resolved SQL plus the collaborator's error text.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub sql: String,
    pub results: Vec<ResultRow>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomersPage {
    pub customers: Vec<Customer>,
    pub processes: Vec<Process>,
}

#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub process_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CustomerCreated {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct DocumentsPage {
    pub customers: Vec<PendingAssignment>,
    pub document_types: Vec<DocumentType>,
    pub recent_submissions: Vec<SubmissionView>,
}

#[derive(Debug, Deserialize)]
pub struct RequiredDocumentsParams {
    pub process_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewSubmission {
    pub customer_id: i64,
    pub process_id: i64,
    pub document_type_id: i64,
    pub file_url: String,
    pub extracted_data: Option<String>,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pool = state.db.pool();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pool_size: pool.size(),
        pool_idle: pool.num_idle(),
    })
}

/// Execute a natural-language query.
///
/// Always answers HTTP 200; both "not understood" and execution failure are
/// reported inside the response body, and the service stays ready for the
/// next question.
pub async fn execute_query(
    State(state): State<Arc<AppState>>,
    Form(request): Form<QueryRequest>,
) -> Json<QueryResponse> {
    let question = request.query.trim();
    tracing::info!(question, "natural-language query");

    let Some(translation) = translate(question) else {
        return Json(QueryResponse {
            sql: String::new(),
            results: Vec::new(),
            error: Some(NOT_UNDERSTOOD.to_string()),
        });
    };

    match state.db.fetch_all(&translation).await {
        Ok(results) => Json(QueryResponse {
            sql: translation.sql,
            results,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "translated query failed");
            Json(QueryResponse {
                sql: translation.sql,
                results: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    }
}

/// Customer registration page data: all customers plus enrollable processes.
pub async fn customers_page(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CustomersPage>, GatewayError> {
    let customers = state.store.list_customers().await?;
    let processes = state.store.active_processes().await?;
    Ok(Json(CustomersPage {
        customers,
        processes,
    }))
}

pub async fn add_customer(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewCustomer>,
) -> Result<(StatusCode, Json<CustomerCreated>), GatewayError> {
    let id = state
        .store
        .add_customer(
            &form.name,
            &form.email,
            form.phone.as_deref(),
            form.process_id,
        )
        .await?;
    tracing::info!(id, email = %form.email, "customer registered");
    Ok((StatusCode::CREATED, Json(CustomerCreated { id })))
}

/// Document submission page data.
pub async fn documents_page(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentsPage>, GatewayError> {
    let customers = state.store.pending_assignments().await?;
    let document_types = state.store.document_types().await?;
    let recent_submissions = state.store.recent_submissions().await?;
    Ok(Json(DocumentsPage {
        customers,
        document_types,
        recent_submissions,
    }))
}

pub async fn required_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RequiredDocumentsParams>,
) -> Result<Json<Vec<DocumentType>>, GatewayError> {
    let docs = state.store.required_documents(params.process_id).await?;
    Ok(Json(docs))
}

pub async fn submit_document(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewSubmission>,
) -> Result<Json<SubmissionOutcome>, GatewayError> {
    let outcome = state
        .store
        .submit_document(
            form.customer_id,
            form.process_id,
            form.document_type_id,
            &form.file_url,
            form.extracted_data.as_deref(),
        )
        .await?;
    tracing::info!(
        customer_id = form.customer_id,
        process_id = form.process_id,
        completion = outcome.completion_percentage,
        "document submitted"
    );
    Ok(Json(outcome))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DashboardRow>>, GatewayError> {
    let rows = state.store.dashboard().await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::store::Store;
    use quickdocs_core::engine::Db;
    use quickdocs_core::schema::{ensure_schema, seed_if_empty};

    async fn seeded_state() -> Arc<AppState> {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
        seed_if_empty(db.pool()).await.unwrap();
        let store = Store::new(db.pool().clone());
        Arc::new(AppState {
            db,
            store,
            config: GatewayConfig::default(),
        })
    }

    async fn ask(state: Arc<AppState>, question: &str) -> QueryResponse {
        let Json(response) = execute_query(
            State(state),
            Form(QueryRequest {
                query: question.to_string(),
            }),
        )
        .await;
        response
    }

    #[tokio::test]
    async fn test_query_response_carries_rows_on_success() {
        let state = seeded_state().await;
        let response = ask(state, "show all customers").await;
        assert!(response.error.is_none());
        assert!(response.sql.starts_with("SELECT id, name, email"));
        assert!(!response.results.is_empty());
    }

    #[tokio::test]
    async fn test_query_response_for_unrecognized_question() {
        let state = seeded_state().await;
        let response = ask(state, "what is the weather").await;
        assert_eq!(response.error.as_deref(), Some(NOT_UNDERSTOOD));
        assert!(response.sql.is_empty());
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_query_response_reports_execution_failure() {
        let state = seeded_state().await;
        // A recognized question whose query can no longer run. Seeded rows
        // reference document_types, so disable enforcement for the drop.
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(state.db.pool())
            .await
            .unwrap();
        sqlx::query("DROP TABLE document_types")
            .execute(state.db.pool())
            .await
            .unwrap();

        let response = ask(state, "list document types").await;
        assert!(response.sql.contains("FROM document_types"));
        assert!(response.results.is_empty());
        let error = response.error.unwrap();
        assert!(error.contains("no such table"), "unexpected error: {error}");
    }
}
