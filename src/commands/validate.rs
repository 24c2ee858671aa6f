use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::config::load_config;
use crate::ingest::pipeline::{UploadOptions, run_validate};
use crate::ingest::schema::ArchiveSchema;

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub input: PathBuf,
}

pub fn run(opts: &ValidateOptions) -> Result<CommandReport> {
    let cfg = load_config()?;
    let mut report = CommandReport::new("validate");
    report.detail(format!("input={}", opts.input.display()));
    report.detail(format!("strict_fields={}", cfg.validation.strict_fields));

    let upload_opts = UploadOptions {
        strict_fields: cfg.validation.strict_fields,
    };
    match run_validate(&opts.input, &ArchiveSchema::default(), &upload_opts) {
        Ok((source, validated)) => {
            report.detail(format!("source={source}"));
            let mut counts = serde_json::Map::new();
            for (file, count) in validated.counts() {
                report.detail(format!("{file}={count} records"));
                counts.insert(file.name().to_string(), json!(count));
            }
            report.set_data(json!({ "source": source.as_str(), "counts": counts }));
        }
        Err(err) => {
            report.issue(err.to_string());
            report.set_data(json!({ "error": { "code": err.code(), "message": err.to_string() } }));
        }
    }

    Ok(report)
}
