//! Builder for creating and configuring Coordinator instances.

use std::path::{Path, PathBuf};

use log::debug;
use tokio::task;

use super::Coordinator;
use crate::{
    db::Database,
    error::{CutoverError, Result},
};

/// Builder for creating and configuring Coordinator instances.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorBuilder {
    database_path: Option<PathBuf>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/cutover/cutover.db` or `~/.local/share/cutover/cutover.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured coordinator.
    ///
    /// The database file is created and its schema applied up front so that
    /// configuration problems surface here rather than on the first call.
    ///
    /// # Errors
    ///
    /// Returns `CutoverError::FileSystem` if the database directory cannot be
    /// created, `CutoverError::Database` if database initialization fails and
    /// `CutoverError::Configuration` if the database was written by a newer
    /// version.
    pub async fn build(self) -> Result<Coordinator> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CutoverError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        debug!("Using database at {}", db_path.display());

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), CutoverError>(())
        })
        .await
        .map_err(|e| CutoverError::task_join(&e))??;

        Ok(Coordinator::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("cutover")
            .place_data_file("cutover.db")
            .map_err(|e| CutoverError::XdgDirectory(e.to_string()))
    }
}
