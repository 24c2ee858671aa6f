use anyhow::Result;

use crate::commands::CommandReport;
use crate::config::load_config;
use crate::paths::resolve_paths;
use crate::query::QueryContext;
use crate::query::tweets::{TweetOrder, first_tweets, top_tweets};
use crate::query::views::TweetView;

#[derive(Debug, Clone)]
pub struct TweetsOptions {
    pub account_id: String,
    pub limit: Option<usize>,
    pub order: TweetOrder,
}

fn command_name(order: TweetOrder) -> &'static str {
    match order {
        TweetOrder::Chronological => "first-tweets",
        TweetOrder::Engagement => "top-tweets",
    }
}

fn summary_line(view: &TweetView) -> String {
    let reply = view
        .in_reply_to_screen_name
        .as_deref()
        .map(|name| format!(" (reply to @{name})"))
        .unwrap_or_default();
    format!(
        "{} @{} [{}]: {} | rt={} fav={}{}",
        view.created_at,
        view.username,
        view.display_name,
        view.text.replace('\n', " "),
        view.retweet_count,
        view.favorite_count,
        reply
    )
}

pub fn run(opts: &TweetsOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let paths = resolve_paths()?;
    let mut report = CommandReport::new(command_name(opts.order));

    let limit = opts.limit.unwrap_or(match opts.order {
        TweetOrder::Chronological => cfg.query.first_tweets_limit,
        TweetOrder::Engagement => cfg.query.top_tweets_limit,
    });
    if limit == 0 {
        report.issue("limit must be >= 1");
        return Ok(report);
    }

    let ctx = QueryContext::new(&paths.db_path);
    report.detail(format!("store={}", ctx.db_path().display()));
    report.detail(format!("account_id={}", opts.account_id));
    report.detail(format!("limit={limit}"));

    let views = match opts.order {
        TweetOrder::Chronological => first_tweets(&ctx, &opts.account_id, Some(limit))?,
        TweetOrder::Engagement => top_tweets(&ctx, &opts.account_id, Some(limit))?,
    };
    report.detail(format!("tweets={}", views.len()));
    for view in &views {
        report.detail(summary_line(view));
    }
    report.set_data(serde_json::to_value(&views)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::summary_line;
    use crate::query::views::TweetView;

    #[test]
    fn summary_line_flattens_text_and_marks_replies() {
        let view = TweetView {
            tweet_id: "1".to_string(),
            username: "ada".to_string(),
            display_name: "Ada".to_string(),
            profile_image_url: String::new(),
            text: "two\nlines".to_string(),
            favorite_count: 4,
            retweet_count: 2,
            created_at: "2020-01-01T00:00:00Z".to_string(),
            in_reply_to_screen_name: Some("babbage".to_string()),
        };
        assert_eq!(
            summary_line(&view),
            "2020-01-01T00:00:00Z @ada [Ada]: two lines | rt=2 fav=4 (reply to @babbage)"
        );
    }
}
