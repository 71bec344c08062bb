//! Embedded tracking schema and first-run sample data.
//!
//! The schema is applied statement by statement with `CREATE TABLE IF NOT
//! EXISTS`, so it is safe to run on every startup. Sample data is only
//! loaded into an empty database.

use sqlx::SqlitePool;

use crate::error::{QuickdocsError, QuickdocsResult};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        registration_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS processes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS document_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        required_fields TEXT
    )",
    "CREATE TABLE IF NOT EXISTS process_assignments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customers(id),
        process_id INTEGER NOT NULL REFERENCES processes(id),
        assignment_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        status TEXT NOT NULL DEFAULT 'pending',
        completion_percentage INTEGER NOT NULL DEFAULT 0,
        UNIQUE (customer_id, process_id)
    )",
    "CREATE TABLE IF NOT EXISTS process_document_requirements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        process_id INTEGER NOT NULL REFERENCES processes(id),
        document_type_id INTEGER NOT NULL REFERENCES document_types(id),
        is_required INTEGER NOT NULL DEFAULT 1,
        UNIQUE (process_id, document_type_id)
    )",
    // The unique key is what lets a re-upload replace the previous
    // submission of the same document type.
    "CREATE TABLE IF NOT EXISTS document_submissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customers(id),
        process_id INTEGER NOT NULL REFERENCES processes(id),
        document_type_id INTEGER NOT NULL REFERENCES document_types(id),
        file_url TEXT,
        ocr_extracted_data TEXT,
        validation_status TEXT NOT NULL DEFAULT 'pending',
        upload_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (customer_id, process_id, document_type_id)
    )",
];

const SAMPLE_DATA: &[&str] = &[
    "INSERT INTO processes (id, name, description, status) VALUES
        (1, 'Customer Onboarding', 'Standard onboarding for new customers', 'active'),
        (2, 'KYC Review', 'Know-your-customer verification', 'active'),
        (3, 'Loan Application', 'Documentation for personal loan requests', 'active')",
    "INSERT INTO document_types (id, name, description, required_fields) VALUES
        (1, 'Passport', 'Government issued passport', '{\"fields\": [\"number\", \"expiry_date\"]}'),
        (2, 'Utility Bill', 'Recent utility bill as proof of address', '{\"fields\": [\"address\", \"issue_date\"]}'),
        (3, 'Bank Statement', 'Bank statement covering the last three months', '{\"fields\": [\"iban\", \"period\"]}'),
        (4, 'Payslip', 'Most recent payslip', '{\"fields\": [\"employer\", \"net_amount\"]}')",
    "INSERT INTO process_document_requirements (process_id, document_type_id, is_required) VALUES
        (1, 1, 1), (1, 2, 1),
        (2, 1, 1), (2, 3, 1),
        (3, 1, 1), (3, 3, 1), (3, 4, 1)",
    "INSERT INTO customers (id, name, email, phone) VALUES
        (1, 'Jane Doe', 'jane.doe@example.com', '555-0101'),
        (2, 'Alice Smith', 'alice.smith@example.com', '555-0102'),
        (3, 'Bob Jones', 'bob.jones@example.com', NULL)",
    "INSERT INTO process_assignments (customer_id, process_id, status, completion_percentage) VALUES
        (1, 1, 'pending', 50),
        (2, 2, 'pending', 0),
        (3, 1, 'completed', 100)",
    "INSERT INTO document_submissions
        (customer_id, process_id, document_type_id, file_url, ocr_extracted_data, validation_status) VALUES
        (1, 1, 1, 'https://files.example.com/jane-passport.pdf', '{\"number\": \"X123\"}', 'approved'),
        (3, 1, 1, 'https://files.example.com/bob-passport.pdf', '{\"number\": \"Y456\"}', 'approved'),
        (3, 1, 2, 'https://files.example.com/bob-utility.pdf', '{\"address\": \"12 Elm St\"}', 'approved'),
        (2, 2, 1, 'https://files.example.com/alice-passport.pdf', NULL, 'pending')",
];

/// Apply the tracking schema. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> QuickdocsResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| QuickdocsError::Execution(e.to_string()))?;
    }
    Ok(())
}

/// Load sample data into an empty database.
///
/// Returns `true` if the seed ran, `false` if data was already present.
pub async fn seed_if_empty(pool: &SqlitePool) -> QuickdocsResult<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM processes")
        .fetch_one(pool)
        .await
        .map_err(|e| QuickdocsError::Execution(e.to_string()))?;

    if count > 0 {
        return Ok(false);
    }

    for statement in SAMPLE_DATA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| QuickdocsError::Execution(e.to_string()))?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Db;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let db = Db::connect("sqlite::memory:").await.unwrap();
        ensure_schema(db.pool()).await.unwrap();
        assert!(seed_if_empty(db.pool()).await.unwrap());
        assert!(!seed_if_empty(db.pool()).await.unwrap());
    }
}
