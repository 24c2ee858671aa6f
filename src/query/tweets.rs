use anyhow::{Context, Result};
use rusqlite::params;
use tracing::debug;

use crate::query::QueryContext;
use crate::query::views::{JoinedAccount, TweetRow, TweetView, project_tweet};

pub const DEFAULT_FIRST_TWEETS_LIMIT: usize = 100;
pub const DEFAULT_TOP_TWEETS_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetOrder {
    /// Oldest first.
    Chronological,
    /// Most retweeted first, then most favorited.
    Engagement,
}

impl TweetOrder {
    fn order_by(self) -> &'static str {
        match self {
            Self::Chronological => "t.created_at ASC, t.tweet_id ASC",
            Self::Engagement => "t.retweet_count DESC, t.favorite_count DESC, t.tweet_id ASC",
        }
    }
}

fn tweets_sql(order: TweetOrder) -> String {
    format!(
        "SELECT t.tweet_id, t.full_text, t.favorite_count, t.retweet_count, t.created_at,
                t.reply_to_username, a.username, a.account_display_name,
                (SELECT p.avatar_media_url FROM profile p
                  WHERE p.account_id = a.account_id
                  ORDER BY p.id ASC LIMIT 1) AS avatar_media_url
         FROM tweets t
         INNER JOIN account a ON a.account_id = t.account_id
         WHERE t.account_id = ?1
         ORDER BY {}
         LIMIT ?2",
        order.order_by()
    )
}

/// Tweets for one account joined with its account and first profile row.
/// An unknown account yields an empty list.
pub fn fetch_tweets(
    ctx: &QueryContext,
    account_id: &str,
    order: TweetOrder,
    limit: usize,
) -> Result<Vec<TweetView>> {
    let conn = ctx.connect()?;
    let mut stmt = conn
        .prepare(&tweets_sql(order))
        .context("failed to prepare tweets query")?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let rows = stmt
        .query_map(params![account_id, limit], |row| {
            Ok(TweetRow {
                tweet_id: row.get(0)?,
                full_text: row.get(1)?,
                favorite_count: row.get(2)?,
                retweet_count: row.get(3)?,
                created_at: row.get(4)?,
                reply_to_username: row.get(5)?,
                account: Some(JoinedAccount {
                    username: row.get(6)?,
                    account_display_name: row.get(7)?,
                    avatar_media_url: row.get(8)?,
                }),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("failed to read tweets for {account_id}"))?;

    debug!(account_id, ?order, rows = rows.len(), "fetched tweets");
    Ok(rows.into_iter().map(project_tweet).collect())
}

pub fn first_tweets(
    ctx: &QueryContext,
    account_id: &str,
    limit: Option<usize>,
) -> Result<Vec<TweetView>> {
    fetch_tweets(
        ctx,
        account_id,
        TweetOrder::Chronological,
        limit.unwrap_or(DEFAULT_FIRST_TWEETS_LIMIT),
    )
}

pub fn top_tweets(
    ctx: &QueryContext,
    account_id: &str,
    limit: Option<usize>,
) -> Result<Vec<TweetView>> {
    fetch_tweets(
        ctx,
        account_id,
        TweetOrder::Engagement,
        limit.unwrap_or(DEFAULT_TOP_TWEETS_LIMIT),
    )
}

#[cfg(test)]
mod tests {
    use super::{first_tweets, top_tweets};
    use crate::query::fixtures::seeded_store;
    use crate::query::views::UNKNOWN;

    fn ids(views: &[crate::query::views::TweetView]) -> Vec<&str> {
        views.iter().map(|v| v.tweet_id.as_str()).collect()
    }

    #[test]
    fn first_tweets_are_oldest_first_with_joined_account() {
        let store = seeded_store();
        let views = first_tweets(&store.ctx, "acct-1", None).expect("query");
        assert_eq!(ids(&views), vec!["t1", "t2", "t3", "t4", "t5"]);
        assert_eq!(views[0].username, "ada");
        assert_eq!(views[0].display_name, "Ada Lovelace");
        assert_eq!(views[0].profile_image_url, "https://img.example/ada.png");
        assert_eq!(views[0].in_reply_to_screen_name.as_deref(), Some("babbage"));
        assert_eq!(views[0].text, "text of t1");
    }

    #[test]
    fn top_tweets_order_by_retweets_then_favorites() {
        let store = seeded_store();
        let views = top_tweets(&store.ctx, "acct-1", None).expect("query");
        assert_eq!(ids(&views), vec!["t5", "t1", "t3", "t4", "t2"]);
    }

    #[test]
    fn limit_caps_result_size() {
        let store = seeded_store();
        let views = top_tweets(&store.ctx, "acct-1", Some(2)).expect("query");
        assert_eq!(ids(&views), vec!["t5", "t1"]);
        let views = first_tweets(&store.ctx, "acct-1", Some(1)).expect("query");
        assert_eq!(ids(&views), vec!["t1"]);
    }

    #[test]
    fn missing_profile_and_display_name_fall_back() {
        let store = seeded_store();
        let views = first_tweets(&store.ctx, "acct-2", None).expect("query");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].username, "babbage");
        assert_eq!(views[0].display_name, UNKNOWN);
        assert_eq!(views[0].profile_image_url, "");
    }

    #[test]
    fn unknown_account_is_empty_not_error() {
        let store = seeded_store();
        assert!(first_tweets(&store.ctx, "nobody", None).expect("query").is_empty());
        assert!(top_tweets(&store.ctx, "nobody", None).expect("query").is_empty());
    }
}
