//! SQLite rendition of the backend read schema.
//!
//! The viewer backend owns these tables; this crate only reads them. The DDL
//! lives here so local stores and tests share one definition.

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::info;

const SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS account (
    account_id TEXT PRIMARY KEY,
    username TEXT,
    account_display_name TEXT,
    created_at TEXT,
    created_via TEXT,
    email TEXT
);

CREATE TABLE IF NOT EXISTS profile (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL REFERENCES account(account_id),
    bio TEXT,
    website TEXT,
    location TEXT,
    avatar_media_url TEXT,
    header_media_url TEXT
);

CREATE TABLE IF NOT EXISTS archive_upload (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL REFERENCES account(account_id),
    archive_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tweets (
    tweet_id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES account(account_id),
    created_at TEXT NOT NULL,
    full_text TEXT NOT NULL DEFAULT '',
    retweet_count INTEGER NOT NULL DEFAULT 0,
    favorite_count INTEGER NOT NULL DEFAULT 0,
    reply_to_tweet_id TEXT,
    reply_to_user_id TEXT,
    reply_to_username TEXT
);

CREATE INDEX IF NOT EXISTS idx_tweets_account_created ON tweets(account_id, created_at);
CREATE INDEX IF NOT EXISTS idx_tweets_account_engagement
    ON tweets(account_id, retweet_count DESC, favorite_count DESC);
CREATE INDEX IF NOT EXISTS idx_profile_account ON profile(account_id);
CREATE INDEX IF NOT EXISTS idx_archive_upload_account ON archive_upload(account_id);
";

/// Create the read schema if missing. Idempotent.
pub fn init_schema(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;

    let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current < SCHEMA_VERSION {
        info!(from = current, to = SCHEMA_VERSION, "initializing store schema");
    }
    conn.execute_batch(SCHEMA_SQL)
        .context("failed to create store schema")?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// A fresh read-only connection. Callers never share one across requests.
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    Ok(conn)
}

pub fn schema_version(db_path: &Path) -> Result<i32> {
    let conn = open_read_only(db_path)?;
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_VERSION, init_schema, open_read_only, schema_version};
    use tempfile::tempdir;

    #[test]
    fn init_is_idempotent_and_versions_the_store() {
        let tmp = tempdir().expect("tempdir");
        let db = tmp.path().join("nested/archive.sqlite");
        init_schema(&db).expect("first init");
        init_schema(&db).expect("second init");
        assert_eq!(schema_version(&db).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn read_only_connection_rejects_writes() {
        let tmp = tempdir().expect("tempdir");
        let db = tmp.path().join("archive.sqlite");
        init_schema(&db).expect("init");
        let conn = open_read_only(&db).expect("open");
        assert!(
            conn.execute("INSERT INTO account (account_id) VALUES ('x')", [])
                .is_err()
        );
    }

    #[test]
    fn read_only_open_fails_for_missing_store() {
        let tmp = tempdir().expect("tempdir");
        assert!(open_read_only(&tmp.path().join("missing.sqlite")).is_err());
    }
}
