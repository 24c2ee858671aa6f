use anyhow::Result;
use serde_json::json;
use std::env;

use crate::commands::CommandReport;
use crate::config::{load_config, resolve_config_path};
use crate::ingest::audit::read_events;
use crate::paths::resolve_paths;
use crate::query::store::schema_version;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/birdvault_env_allowlist.rs"));
}

const ENV_PREFIX: &str = "BIRDVAULT_";

/// Splits the set `BIRDVAULT_*` variables into recognized and unknown names.
fn classify_env<I>(names: I, allowlist: &[&str]) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        if !name.starts_with(ENV_PREFIX) {
            continue;
        }
        if allowlist.contains(&name.as_str()) {
            known.push(name);
        } else {
            unknown.push(name);
        }
    }
    known.sort();
    unknown.sort();
    (known, unknown)
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");
    report.detail(format!("build_id={}", env!("BUILD_UUID")));
    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("store={}", paths.db_path.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    match resolve_config_path() {
        Some(path) if path.exists() => report.detail(format!("config={}", path.display())),
        Some(path) => report.detail(format!("config={} (absent, defaults)", path.display())),
        None => report.detail("config=unresolved (defaults)"),
    }

    let mut data = json!({
        "home": paths.home,
        "store": paths.db_path,
        "logsDir": paths.logs_dir,
    });

    match load_config() {
        Ok(cfg) => {
            report.detail(format!(
                "upload_target={}{}",
                cfg.upload.base_url.trim_end_matches('/'),
                cfg.upload.endpoint_path
            ));
            report.detail(format!("upload_timeout_secs={}", cfg.upload.timeout_secs));
            report.detail(format!(
                "session_cookie={}",
                if cfg.upload.session_cookie.is_some() { "set" } else { "unset" }
            ));
            report.detail(format!(
                "limits first={} top={}",
                cfg.query.first_tweets_limit, cfg.query.top_tweets_limit
            ));
            report.detail(format!("strict_fields={}", cfg.validation.strict_fields));
            data["config"] = json!({
                "baseUrl": cfg.upload.base_url,
                "endpointPath": cfg.upload.endpoint_path,
                "timeoutSecs": cfg.upload.timeout_secs,
                "firstTweetsLimit": cfg.query.first_tweets_limit,
                "topTweetsLimit": cfg.query.top_tweets_limit,
                "strictFields": cfg.validation.strict_fields,
            });
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }

    let (known, unknown) = classify_env(
        env::vars().map(|(name, _)| name),
        generated::GENERATED_ENV_ALLOWLIST,
    );
    if !known.is_empty() {
        report.detail(format!("env={}", known.join(",")));
    }
    for name in &unknown {
        report.issue(format!("unrecognized environment variable {name}"));
    }

    if paths.db_path.exists() {
        match schema_version(&paths.db_path) {
            Ok(version) => {
                report.detail(format!("store_schema_version={version}"));
                data["storeSchemaVersion"] = json!(version);
            }
            Err(err) => report.issue(format!("store unreadable: {err:#}")),
        }
    } else {
        report.detail("store=missing (run store-init)");
    }

    match read_events(&paths.logs_dir) {
        Ok(events) => {
            report.detail(format!("uploads_recorded={}", events.len()));
            if let Some(last) = events.last() {
                report.detail(format!(
                    "last_upload={} {} {} {}",
                    last.at, last.source, last.status, last.message
                ));
                data["lastUpload"] = serde_json::to_value(last)?;
            }
        }
        Err(err) => report.issue(format!("audit log unreadable: {err:#}")),
    }

    report.set_data(data);
    Ok(report)
}
