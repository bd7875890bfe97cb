//! Database operations and SQLite management for plans and executions.
//!
//! [`Database`] is the store the workflow engine runs against. Query code is
//! split per aggregate:
//!
//! - [`plan_queries`]: plan templates and the merge update
//! - [`execution_queries`]: snapshot creation, lookup, listing, deletion
//! - [`step_queries`]: execution steps and their messages
//! - [`approval_queries`]: approval records
//! - [`fallback_queries`]: fallback requests and substitution
//!
//! Every operation that writes more than one row runs in a single
//! transaction; committing it is the flush point.

use std::path::Path;

use log::debug;
use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod approval_queries;
pub mod execution_queries;
pub mod fallback_queries;
pub mod migrations;
pub mod plan_queries;
pub mod step_queries;
pub mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Opening database at {}", path.as_ref().display());
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().db_context("Failed to open in-memory database")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
