//! Subcommand implementations.
//!
//! Each command writes to the `out` it is given so tests can capture output.

use std::path::Path;

use solestyle_core::StorageError;
use solestyle_storefront::storage::FileStorage;
use thiserror::Error;

pub mod cart;
pub mod orders;
pub mod visitors;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("data directory {0} does not exist")]
    MissingDataDir(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open an existing data directory.
///
/// Unlike the storefront, the CLI never creates the directory: a typo in
/// `--data-dir` should fail instead of reporting an empty store.
pub fn open_storage(data_dir: &Path) -> Result<FileStorage, CliError> {
    if !data_dir.is_dir() {
        return Err(CliError::MissingDataDir(data_dir.display().to_string()));
    }
    Ok(FileStorage::open(data_dir)?)
}
