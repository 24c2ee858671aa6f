//! Typed projections from joined store rows to display records.

use serde::Serialize;

pub const UNKNOWN: &str = "Unknown";

/// Account columns joined onto a tweet. `None` when the join produced nothing.
#[derive(Debug, Clone, Default)]
pub struct JoinedAccount {
    pub username: Option<String>,
    pub account_display_name: Option<String>,
    pub avatar_media_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TweetRow {
    pub tweet_id: String,
    pub full_text: Option<String>,
    pub favorite_count: i64,
    pub retweet_count: i64,
    pub created_at: String,
    pub reply_to_username: Option<String>,
    pub account: Option<JoinedAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TweetView {
    pub tweet_id: String,
    pub username: String,
    pub display_name: String,
    pub profile_image_url: String,
    pub text: String,
    pub favorite_count: i64,
    pub retweet_count: i64,
    pub created_at: String,
    pub in_reply_to_screen_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRow {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub avatar_media_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub account_id: String,
    pub username: Option<String>,
    pub account_display_name: Option<String>,
    pub created_at: Option<String>,
    pub profile: Option<ProfileRow>,
    pub archive_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub account_id: String,
    pub username: String,
    pub display_name: String,
    pub created_at: Option<String>,
    pub bio: String,
    pub website: String,
    pub location: String,
    pub avatar_media_url: String,
    pub archive_uploaded_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub account: AccountView,
    #[serde(rename = "tweetCount")]
    pub tweet_count: Option<i64>,
}

/// Empty strings count as absent, matching how the viewer renders them.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn or_unknown(value: Option<&str>) -> String {
    present(value).unwrap_or(UNKNOWN).to_string()
}

fn or_empty(value: Option<&str>) -> String {
    present(value).unwrap_or_default().to_string()
}

pub fn project_tweet(row: TweetRow) -> TweetView {
    let account = row.account.unwrap_or_default();
    TweetView {
        tweet_id: row.tweet_id,
        username: or_unknown(account.username.as_deref()),
        display_name: or_unknown(account.account_display_name.as_deref()),
        profile_image_url: or_empty(account.avatar_media_url.as_deref()),
        text: row.full_text.unwrap_or_default(),
        favorite_count: row.favorite_count,
        retweet_count: row.retweet_count,
        created_at: row.created_at,
        in_reply_to_screen_name: row.reply_to_username,
    }
}

pub fn project_account(row: AccountRow) -> AccountView {
    let profile = row.profile.unwrap_or_default();
    let username = or_unknown(row.username.as_deref());
    let display_name = present(row.account_display_name.as_deref())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| username.clone());
    AccountView {
        account_id: row.account_id,
        username,
        display_name,
        created_at: row.created_at,
        bio: or_empty(profile.bio.as_deref()),
        website: or_empty(profile.website.as_deref()),
        location: or_empty(profile.location.as_deref()),
        avatar_media_url: or_empty(profile.avatar_media_url.as_deref()),
        archive_uploaded_at: row.archive_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AccountRow, JoinedAccount, ProfileRow, TweetRow, UNKNOWN, UserData, project_account,
        project_tweet,
    };
    use serde_json::json;

    fn tweet_row(account: Option<JoinedAccount>) -> TweetRow {
        TweetRow {
            tweet_id: "100".to_string(),
            full_text: Some("hello".to_string()),
            favorite_count: 3,
            retweet_count: 1,
            created_at: "2020-01-01T00:00:00Z".to_string(),
            reply_to_username: None,
            account,
        }
    }

    #[test]
    fn tweet_without_join_falls_back() {
        let view = project_tweet(tweet_row(None));
        assert_eq!(view.username, UNKNOWN);
        assert_eq!(view.display_name, UNKNOWN);
        assert_eq!(view.profile_image_url, "");
        assert_eq!(view.text, "hello");
    }

    #[test]
    fn empty_strings_are_treated_as_missing() {
        let view = project_tweet(tweet_row(Some(JoinedAccount {
            username: Some(String::new()),
            account_display_name: Some("Ada".to_string()),
            avatar_media_url: Some(String::new()),
        })));
        assert_eq!(view.username, UNKNOWN);
        assert_eq!(view.display_name, "Ada");
        assert_eq!(view.profile_image_url, "");
    }

    #[test]
    fn tweet_view_serializes_reply_target_as_null() {
        let view = project_tweet(tweet_row(None));
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["in_reply_to_screen_name"], json!(null));
        assert_eq!(json["username"], json!("Unknown"));
    }

    #[test]
    fn account_projection_fills_profile_defaults() {
        let view = project_account(AccountRow {
            account_id: "1".to_string(),
            username: Some("ada".to_string()),
            account_display_name: None,
            created_at: Some("2009-03-01".to_string()),
            profile: Some(ProfileRow {
                bio: Some("math".to_string()),
                ..ProfileRow::default()
            }),
            archive_at: None,
        });
        assert_eq!(view.display_name, "ada");
        assert_eq!(view.bio, "math");
        assert_eq!(view.website, "");
        assert!(view.archive_uploaded_at.is_none());
    }

    #[test]
    fn user_data_uses_camel_case_count_key() {
        let data = UserData {
            account: project_account(AccountRow {
                account_id: "1".to_string(),
                username: None,
                account_display_name: None,
                created_at: None,
                profile: None,
                archive_at: None,
            }),
            tweet_count: Some(12),
        };
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["tweetCount"], json!(12));
        assert_eq!(json["account"]["username"], json!("Unknown"));
    }
}
