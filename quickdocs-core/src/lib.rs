//! # QuickDocs Core
//!
//! QuickDocs tracks document submissions: customers enroll in a process (a
//! named workflow requiring a set of document types) and upload documents
//! against it. This crate holds the pieces shared by the gateway and the CLI:
//!
//! - [`translator`] — maps a closed set of English phrasings onto
//!   parameterized SQL over the tracking schema.
//! - [`engine`] — executes a translation against SQLite and returns rows as
//!   JSON-valued maps.
//! - [`schema`] — the embedded tracking schema and first-run sample data.
//!
//! ## Quick Example
//!
//! ```rust
//! use quickdocs_core::translate;
//!
//! let t = translate("Show all customers").unwrap();
//! assert!(t.sql.starts_with("SELECT id, name, email"));
//! assert!(t.params.is_empty());
//! ```

pub mod engine;
pub mod error;
pub mod schema;
pub mod translator;

pub mod prelude {
    pub use crate::engine::{Db, ResultRow};
    pub use crate::error::{QuickdocsError, QuickdocsResult};
    pub use crate::schema::{ensure_schema, seed_if_empty};
    pub use crate::translator::{translate, Translation};
}

pub use translator::{translate, Translation};
