pub mod store;
pub mod tweets;
pub mod user;
pub mod views;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Per-request handle on the store. Each query opens its own connection from
/// it; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct QueryContext {
    db_path: PathBuf,
}

impl QueryContext {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn connect(&self) -> Result<Connection> {
        store::open_read_only(&self.db_path)
    }
}
