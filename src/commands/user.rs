use anyhow::Result;

use crate::commands::CommandReport;
use crate::paths::resolve_paths;
use crate::query::QueryContext;
use crate::query::user::user_data;

#[derive(Debug, Clone)]
pub struct UserOptions {
    pub account_id: String,
}

pub fn run(opts: &UserOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("user");
    let ctx = QueryContext::new(&paths.db_path);
    report.detail(format!("store={}", ctx.db_path().display()));
    report.detail(format!("account_id={}", opts.account_id));

    let Some(data) = user_data(&ctx, &opts.account_id)? else {
        report.detail("account not found");
        report.set_data(serde_json::Value::Null);
        return Ok(report);
    };

    let account = &data.account;
    report.detail(format!("username=@{}", account.username));
    report.detail(format!("display_name={}", account.display_name));
    if let Some(created_at) = &account.created_at {
        report.detail(format!("created_at={created_at}"));
    }
    for (label, value) in [
        ("bio", &account.bio),
        ("website", &account.website),
        ("location", &account.location),
        ("avatar", &account.avatar_media_url),
    ] {
        if !value.is_empty() {
            report.detail(format!("{label}={value}"));
        }
    }
    if let Some(uploaded) = &account.archive_uploaded_at {
        report.detail(format!("archive_uploaded_at={uploaded}"));
    }
    match data.tweet_count {
        Some(count) => report.detail(format!("tweet_count={count}")),
        None => report.detail("tweet_count=unknown"),
    }

    report.set_data(serde_json::to_value(&data)?);
    Ok(report)
}
