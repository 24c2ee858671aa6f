use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

use crate::commands::CommandReport;
use crate::config::{load_config, validate};
use crate::ingest::audit::{UploadAuditEvent, append_event};
use crate::ingest::pipeline::{UploadOptions, UploadOutcome, run_upload};
use crate::ingest::progress::{StderrProgress, UploadTracker};
use crate::ingest::schema::ArchiveSchema;
use crate::ingest::submit::{HttpSubmitter, TRANSPORT_FAILURE_MESSAGE};
use crate::paths::resolve_paths;

#[derive(Debug, Clone)]
pub struct UploadCommandOptions {
    pub input: PathBuf,
    pub base_url: Option<String>,
}

pub fn run(opts: &UploadCommandOptions) -> Result<CommandReport> {
    let mut cfg = load_config()?;
    if let Some(base_url) = &opts.base_url {
        cfg.upload.base_url = base_url.trim().to_string();
        validate(&cfg)?;
    }
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("upload");

    let submitter = HttpSubmitter::new(&cfg.upload)?;
    report.detail(format!("input={}", opts.input.display()));
    report.detail(format!("endpoint={}", submitter.url()));

    let sink = StderrProgress;
    let tracker = UploadTracker::new(&sink);
    let upload_opts = UploadOptions {
        strict_fields: cfg.validation.strict_fields,
    };
    let result = run_upload(
        &opts.input,
        &ArchiveSchema::default(),
        &upload_opts,
        &submitter,
        &tracker,
    );

    let event = match &result {
        Ok(done) => {
            report.detail(format!("source={}", done.source));
            for (file, count) in &done.counts {
                report.detail(format!("{file}={count} records"));
            }
            report.detail(format!("document_sha256={}", done.digest));
            match &done.outcome {
                UploadOutcome::Accepted { message } => report.detail(message.clone()),
                UploadOutcome::Rejected {
                    http_status,
                    message,
                } => report.issue(format!("{message} (HTTP {http_status})")),
            }
            report.set_data(json!({
                "source": done.source.as_str(),
                "documentSha256": done.digest,
                "outcome": done.outcome,
            }));
            UploadAuditEvent::now(
                done.source.as_str(),
                done.outcome.status_label(),
                done.outcome.message(),
                Some(done.digest.clone()),
            )
        }
        Err(failure) => {
            if failure.error.is_local() {
                report.issue(failure.error.to_string());
            } else {
                report.issue(TRANSPORT_FAILURE_MESSAGE);
                report.issue(failure.error.to_string());
            }
            report.set_data(json!({
                "source": failure.origin.map(|kind| kind.as_str()),
                "documentSha256": failure.digest,
                "error": {
                    "code": failure.error.code(),
                    "message": failure.error.to_string(),
                },
            }));
            UploadAuditEvent::now(
                failure.origin.map(|kind| kind.as_str()).unwrap_or("unknown"),
                "failed",
                &failure.error.to_string(),
                failure.digest.clone(),
            )
        }
    };

    if let Err(err) = append_event(&paths.logs_dir, &event) {
        warn!(error = %err, "failed to append upload audit event");
    }

    Ok(report)
}
