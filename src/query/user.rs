use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::query::QueryContext;
use crate::query::views::{AccountRow, ProfileRow, UserData, project_account};

const ACCOUNT_SQL: &str = "
SELECT a.account_id, a.username, a.account_display_name, a.created_at,
       p.id, p.bio, p.website, p.location, p.avatar_media_url,
       (SELECT MAX(u.archive_at) FROM archive_upload u
         WHERE u.account_id = a.account_id) AS archive_at
FROM account a
LEFT JOIN profile p
  ON p.id = (SELECT MIN(id) FROM profile WHERE account_id = a.account_id)
WHERE a.account_id = ?1
";

const TWEET_COUNT_SQL: &str = "SELECT COUNT(*) FROM tweets WHERE account_id = ?1";

fn fetch_account(conn: &Connection, account_id: &str) -> Result<Option<AccountRow>> {
    let row = conn
        .query_row(ACCOUNT_SQL, params![account_id], |row| {
            let profile_id: Option<i64> = row.get(4)?;
            let profile = match profile_id {
                Some(_) => Some(ProfileRow {
                    bio: row.get(5)?,
                    website: row.get(6)?,
                    location: row.get(7)?,
                    avatar_media_url: row.get(8)?,
                }),
                None => None,
            };
            Ok(AccountRow {
                account_id: row.get(0)?,
                username: row.get(1)?,
                account_display_name: row.get(2)?,
                created_at: row.get(3)?,
                profile,
                archive_at: row.get(9)?,
            })
        })
        .optional()
        .with_context(|| format!("failed to read account {account_id}"))?;
    Ok(row)
}

/// Best-effort count; a failing count leaves the profile intact.
fn count_tweets(conn: &Connection, account_id: &str) -> Option<i64> {
    match conn.query_row(TWEET_COUNT_SQL, params![account_id], |row| row.get(0)) {
        Ok(count) => Some(count),
        Err(err) => {
            warn!(account_id, error = %err, "tweet count query failed");
            None
        }
    }
}

/// Profile plus tweet count. `None` when the account does not exist, in which
/// case the count query is never issued.
pub fn user_data(ctx: &QueryContext, account_id: &str) -> Result<Option<UserData>> {
    let conn = ctx.connect()?;
    assemble_user(&conn, account_id, count_tweets)
}

fn assemble_user<F>(conn: &Connection, account_id: &str, count: F) -> Result<Option<UserData>>
where
    F: FnOnce(&Connection, &str) -> Option<i64>,
{
    let Some(row) = fetch_account(conn, account_id)? else {
        debug!(account_id, "account not found");
        return Ok(None);
    };

    let tweet_count = count(conn, account_id);
    Ok(Some(UserData {
        account: project_account(row),
        tweet_count,
    }))
}
