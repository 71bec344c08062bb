//! Parameterized CRUD over the tracking schema.
//!
//! Every route in the gateway maps onto one method here; all values reach
//! SQLite through bind parameters.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::GatewayError;

/// A registered customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registration_date: String,
}

/// A workflow definition.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Process {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// A document type a process may require.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DocumentType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub required_fields: Option<String>,
}

/// A customer with a pending process assignment, as shown on the
/// document-submission page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingAssignment {
    pub customer_id: i64,
    pub customer_name: String,
    pub process_id: i64,
    pub process_name: String,
}

/// A document submission joined across customer, process, and type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubmissionView {
    pub id: i64,
    pub customer_name: String,
    pub process_name: String,
    pub document_type_name: String,
    pub file_url: Option<String>,
    pub validation_status: String,
    pub upload_date: String,
}

/// One dashboard row per process assignment.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardRow {
    pub id: i64,
    pub customer_name: String,
    pub process_name: String,
    pub assignment_date: String,
    pub status: String,
    pub completion_percentage: i64,
    pub documents_submitted: i64,
    pub documents_required: i64,
}

/// Result of recording a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub completion_percentage: i64,
    pub status: String,
}

fn query_err(e: sqlx::Error) -> GatewayError {
    GatewayError::Query(e.to_string())
}

/// Data access for the tracking schema.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All customers, newest registration first.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, GatewayError> {
        sqlx::query_as(
            "SELECT id, name, email, phone, registration_date
             FROM customers ORDER BY registration_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// Processes open for enrollment.
    pub async fn active_processes(&self) -> Result<Vec<Process>, GatewayError> {
        sqlx::query_as(
            "SELECT id, name, description, status, created_at
             FROM processes WHERE status = 'active' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// Register a customer, optionally enrolling them in a process.
    ///
    /// Returns the new customer id. A duplicate email maps to
    /// [`GatewayError::Conflict`].
    pub async fn add_customer(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        process_id: Option<i64>,
    ) -> Result<i64, GatewayError> {
        let mut tx = self.pool.begin().await.map_err(query_err)?;

        let result = sqlx::query("INSERT INTO customers (name, email, phone) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(phone)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    GatewayError::Conflict("email already exists".to_string())
                } else {
                    query_err(e)
                }
            })?;
        let customer_id = result.last_insert_rowid();

        if let Some(process_id) = process_id {
            sqlx::query("INSERT INTO process_assignments (customer_id, process_id) VALUES (?, ?)")
                .bind(customer_id)
                .bind(process_id)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)?;
        Ok(customer_id)
    }

    /// Customers with pending process assignments, ordered by customer name.
    pub async fn pending_assignments(&self) -> Result<Vec<PendingAssignment>, GatewayError> {
        sqlx::query_as(
            "SELECT c.id AS customer_id, c.name AS customer_name,
                    p.id AS process_id, p.name AS process_name
             FROM customers c
             JOIN process_assignments pa ON c.id = pa.customer_id
             JOIN processes p ON pa.process_id = p.id
             WHERE pa.status = 'pending'
             ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// All document types, ordered by name.
    pub async fn document_types(&self) -> Result<Vec<DocumentType>, GatewayError> {
        sqlx::query_as(
            "SELECT id, name, description, required_fields FROM document_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// The ten most recent submissions, newest first.
    pub async fn recent_submissions(&self) -> Result<Vec<SubmissionView>, GatewayError> {
        sqlx::query_as(
            "SELECT ds.id, c.name AS customer_name, p.name AS process_name,
                    dt.name AS document_type_name, ds.file_url,
                    ds.validation_status, ds.upload_date
             FROM document_submissions ds
             JOIN customers c ON ds.customer_id = c.id
             JOIN processes p ON ds.process_id = p.id
             JOIN document_types dt ON ds.document_type_id = dt.id
             ORDER BY ds.upload_date DESC
             LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// Document types a process requires.
    pub async fn required_documents(
        &self,
        process_id: i64,
    ) -> Result<Vec<DocumentType>, GatewayError> {
        sqlx::query_as(
            "SELECT dt.id, dt.name, dt.description, dt.required_fields
             FROM document_types dt
             JOIN process_document_requirements pdr ON dt.id = pdr.document_type_id
             WHERE pdr.process_id = ? AND pdr.is_required = 1
             ORDER BY dt.name",
        )
        .bind(process_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }

    /// Record a document submission and refresh the assignment's completion.
    ///
    /// A re-upload of the same document type replaces the previous
    /// submission. `extracted_data` must be valid JSON when present; it is
    /// stored canonicalized.
    pub async fn submit_document(
        &self,
        customer_id: i64,
        process_id: i64,
        document_type_id: i64,
        file_url: &str,
        extracted_data: Option<&str>,
    ) -> Result<SubmissionOutcome, GatewayError> {
        let ocr_json = match extracted_data {
            Some(raw) if !raw.trim().is_empty() => {
                let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                    GatewayError::InvalidInput(format!("extracted_data is not valid JSON: {e}"))
                })?;
                Some(value.to_string())
            }
            _ => None,
        };

        let mut tx = self.pool.begin().await.map_err(query_err)?;

        sqlx::query(
            "INSERT OR REPLACE INTO document_submissions
                 (customer_id, process_id, document_type_id, file_url,
                  ocr_extracted_data, validation_status)
             VALUES (?, ?, ?, ?, ?, 'pending')",
        )
        .bind(customer_id)
        .bind(process_id)
        .bind(document_type_id)
        .bind(file_url)
        .bind(ocr_json)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        let (required,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM process_document_requirements
             WHERE process_id = ? AND is_required = 1",
        )
        .bind(process_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(query_err)?;

        let (approved,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM document_submissions
             WHERE customer_id = ? AND process_id = ? AND validation_status = 'approved'",
        )
        .bind(customer_id)
        .bind(process_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(query_err)?;

        let completion = completion_from_counts(approved, required);
        let status = if completion == 100 { "completed" } else { "pending" };

        sqlx::query(
            "UPDATE process_assignments SET completion_percentage = ?, status = ?
             WHERE customer_id = ? AND process_id = ?",
        )
        .bind(completion)
        .bind(status)
        .bind(customer_id)
        .bind(process_id)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        Ok(SubmissionOutcome {
            completion_percentage: completion,
            status: status.to_string(),
        })
    }

    /// Completion percentage for one assignment: approved submissions over
    /// required documents, clamped to 100.
    pub async fn completion_percentage(
        &self,
        customer_id: i64,
        process_id: i64,
    ) -> Result<i64, GatewayError> {
        let (required,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM process_document_requirements
             WHERE process_id = ? AND is_required = 1",
        )
        .bind(process_id)
        .fetch_one(&self.pool)
        .await
        .map_err(query_err)?;

        let (approved,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM document_submissions
             WHERE customer_id = ? AND process_id = ? AND validation_status = 'approved'",
        )
        .bind(customer_id)
        .bind(process_id)
        .fetch_one(&self.pool)
        .await
        .map_err(query_err)?;

        Ok(completion_from_counts(approved, required))
    }

    /// All assignments with submitted/required document counts, newest
    /// assignment first.
    pub async fn dashboard(&self) -> Result<Vec<DashboardRow>, GatewayError> {
        // DISTINCT keeps the two LEFT JOINs from multiplying each other's
        // row counts.
        sqlx::query_as(
            "SELECT pa.id, c.name AS customer_name, p.name AS process_name,
                    pa.assignment_date, pa.status, pa.completion_percentage,
                    COUNT(DISTINCT ds.id) AS documents_submitted,
                    COUNT(DISTINCT pdr.id) AS documents_required
             FROM process_assignments pa
             JOIN customers c ON pa.customer_id = c.id
             JOIN processes p ON pa.process_id = p.id
             LEFT JOIN document_submissions ds
                    ON pa.customer_id = ds.customer_id AND pa.process_id = ds.process_id
             LEFT JOIN process_document_requirements pdr
                    ON pa.process_id = pdr.process_id AND pdr.is_required = 1
             GROUP BY pa.id, c.name, p.name, pa.assignment_date, pa.status,
                      pa.completion_percentage
             ORDER BY pa.assignment_date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)
    }
}

fn completion_from_counts(approved: i64, required: i64) -> i64 {
    if required == 0 {
        return 0;
    }
    (approved * 100 / required).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickdocs_core::engine::Db;
    use quickdocs_core::schema::ensure_schema;

    async fn empty_store() -> Store {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
        Store::new(db.pool().clone())
    }

    /// One process with two required document types, one enrolled customer.
    async fn fixture() -> (Store, i64, i64) {
        let store = empty_store().await;

        sqlx::query("INSERT INTO processes (id, name) VALUES (1, 'Onboarding')")
            .execute(&store.pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO document_types (id, name) VALUES (1, 'Passport'), (2, 'Utility Bill')")
            .execute(&store.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO process_document_requirements (process_id, document_type_id) VALUES (1, 1), (1, 2)",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let customer_id = store
            .add_customer("Jane Doe", "jane@example.com", Some("555-0101"), Some(1))
            .await
            .unwrap();

        (store, customer_id, 1)
    }

    #[tokio::test]
    async fn test_add_customer_and_assignment() {
        let (store, customer_id, _) = fixture().await;

        let customers = store.list_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, customer_id);

        let pending = store.pending_assignments().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].process_name, "Onboarding");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (store, _, _) = fixture().await;
        let err = store
            .add_customer("Jane Again", "jane@example.com", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_submission_replaces_and_tracks_completion() {
        let (store, customer_id, process_id) = fixture().await;

        // Fresh submissions are pending, so completion stays at zero until
        // they are approved.
        let outcome = store
            .submit_document(customer_id, process_id, 1, "https://files/passport.pdf", None)
            .await
            .unwrap();
        assert_eq!(outcome.completion_percentage, 0);
        assert_eq!(outcome.status, "pending");

        // Re-upload of the same document type replaces, not duplicates.
        store
            .submit_document(customer_id, process_id, 1, "https://files/passport-v2.pdf", None)
            .await
            .unwrap();
        let submissions = store.recent_submissions().await.unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(
            submissions[0].file_url.as_deref(),
            Some("https://files/passport-v2.pdf")
        );

        // Approve the passport: one of two required documents done.
        sqlx::query("UPDATE document_submissions SET validation_status = 'approved'")
            .execute(&store.pool)
            .await
            .unwrap();
        assert_eq!(
            store
                .completion_percentage(customer_id, process_id)
                .await
                .unwrap(),
            50
        );

        // Submitting the second document and approving it flips the
        // assignment to completed.
        store
            .submit_document(customer_id, process_id, 2, "https://files/bill.pdf", None)
            .await
            .unwrap();
        sqlx::query("UPDATE document_submissions SET validation_status = 'approved'")
            .execute(&store.pool)
            .await
            .unwrap();
        let outcome = store
            .submit_document(customer_id, process_id, 2, "https://files/bill-v2.pdf", None)
            .await
            .unwrap();
        assert_eq!(outcome.completion_percentage, 50);

        sqlx::query("UPDATE document_submissions SET validation_status = 'approved'")
            .execute(&store.pool)
            .await
            .unwrap();
        assert_eq!(
            store
                .completion_percentage(customer_id, process_id)
                .await
                .unwrap(),
            100
        );
    }

    #[tokio::test]
    async fn test_invalid_extracted_data_is_rejected() {
        let (store, customer_id, process_id) = fixture().await;
        let err = store
            .submit_document(customer_id, process_id, 1, "https://files/x.pdf", Some("{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_completion_with_no_requirements_is_zero() {
        let store = empty_store().await;
        sqlx::query("INSERT INTO processes (id, name) VALUES (9, 'Empty Process')")
            .execute(&store.pool)
            .await
            .unwrap();
        let customer_id = store
            .add_customer("Bob Jones", "bob@example.com", None, Some(9))
            .await
            .unwrap();
        assert_eq!(store.completion_percentage(customer_id, 9).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_counts_are_not_multiplied() {
        let (store, customer_id, process_id) = fixture().await;

        store
            .submit_document(customer_id, process_id, 1, "https://files/passport.pdf", None)
            .await
            .unwrap();
        store
            .submit_document(customer_id, process_id, 2, "https://files/bill.pdf", None)
            .await
            .unwrap();

        let rows = store.dashboard().await.unwrap();
        assert_eq!(rows.len(), 1);
        // Two submissions x two requirements would read as four under a
        // plain COUNT over the joined rows.
        assert_eq!(rows[0].documents_submitted, 2);
        assert_eq!(rows[0].documents_required, 2);
    }
}
