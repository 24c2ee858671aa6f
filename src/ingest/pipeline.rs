use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{IngestError, SourceKind};
use crate::ingest::LogicalFile;
use crate::ingest::bundle::{ValidatedArchive, document_digest};
use crate::ingest::progress::UploadTracker;
use crate::ingest::schema::ArchiveSchema;
use crate::ingest::source::{detect_source, extract};
use crate::ingest::submit::{
    ArchiveSubmitter, FALLBACK_ACCEPTED_MESSAGE, FALLBACK_REJECTION_MESSAGE,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    pub strict_fields: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Accepted { message: String },
    Rejected { http_status: u16, message: String },
}

impl UploadOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Accepted { message } | Self::Rejected { message, .. } => message,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub source: SourceKind,
    pub counts: Vec<(LogicalFile, usize)>,
    pub digest: String,
    pub outcome: UploadOutcome,
}

/// An upload that ended in an error, with whatever was known at that point.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct UploadFailure {
    pub origin: Option<SourceKind>,
    pub digest: Option<String>,
    #[source]
    pub error: IngestError,
}

impl UploadFailure {
    fn early(origin: Option<SourceKind>, error: IngestError) -> Self {
        Self {
            origin,
            digest: None,
            error,
        }
    }
}

/// Detect, extract and validate. Never touches the network.
pub fn run_validate(
    input: &Path,
    schema: &ArchiveSchema,
    opts: &UploadOptions,
) -> Result<(SourceKind, ValidatedArchive), IngestError> {
    let source = detect_source(input)?;
    let bundle = extract(&source)?;
    let validated = bundle.validate(schema, opts.strict_fields)?;
    Ok((source.kind(), validated))
}

/// Full upload. Every error before the submit step returns without calling
/// `submitter`; the tracker is back at `Idle` on every return.
pub fn run_upload(
    input: &Path,
    schema: &ArchiveSchema,
    opts: &UploadOptions,
    submitter: &dyn ArchiveSubmitter,
    tracker: &UploadTracker<'_>,
) -> Result<UploadReport, UploadFailure> {
    let upload = tracker
        .start()
        .ok_or_else(|| UploadFailure::early(None, IngestError::Busy))?;

    let source = detect_source(input).map_err(|err| UploadFailure::early(None, err))?;
    let kind = source.kind();
    let validated = extract(&source)
        .and_then(|bundle| bundle.validate(schema, opts.strict_fields))
        .map_err(|err| {
            warn!(source = kind.as_str(), error = %err, "archive rejected before upload");
            UploadFailure::early(Some(kind), err)
        })?;

    let document = validated.to_document();
    let digest = document_digest(&document);

    upload.begin_processing();
    let response = submitter.submit(&document).map_err(|err| UploadFailure {
        origin: Some(kind),
        digest: Some(digest.clone()),
        error: err,
    })?;

    let outcome = if response.is_success() {
        UploadOutcome::Accepted {
            message: response
                .message
                .unwrap_or_else(|| FALLBACK_ACCEPTED_MESSAGE.to_string()),
        }
    } else {
        UploadOutcome::Rejected {
            http_status: response.status,
            message: response
                .message
                .unwrap_or_else(|| FALLBACK_REJECTION_MESSAGE.to_string()),
        }
    };
    info!(
        source = kind.as_str(),
        status = outcome.status_label(),
        message = outcome.message(),
        "archive upload finished"
    );

    Ok(UploadReport {
        source: kind,
        counts: validated.counts(),
        digest,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::{UploadOptions, UploadOutcome, run_upload, run_validate};
    use crate::error::{IngestError, SourceKind};
    use crate::ingest::progress::tests::RecordingProgress;
    use crate::ingest::progress::{UploadPhase, UploadTracker};
    use crate::ingest::schema::ArchiveSchema;
    use crate::ingest::source::tests::{sample_entries, write_zip};
    use crate::ingest::submit::{ArchiveSubmitter, FALLBACK_REJECTION_MESSAGE, SubmitResponse};
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct FakeSubmitter {
        calls: RefCell<Vec<Value>>,
        reply: fn() -> Result<SubmitResponse, IngestError>,
    }

    impl FakeSubmitter {
        fn replying(reply: fn() -> Result<SubmitResponse, IngestError>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                reply,
            }
        }

        fn accepting() -> Self {
            Self::replying(|| {
                Ok(SubmitResponse {
                    status: 200,
                    message: Some("Archive stored".to_string()),
                })
            })
        }
    }

    impl ArchiveSubmitter for FakeSubmitter {
        fn submit(&self, document: &Value) -> Result<SubmitResponse, IngestError> {
            self.calls.borrow_mut().push(document.clone());
            (self.reply)()
        }
    }

    fn zip_with(dir: &Path, entries: &[(&'static str, String)]) -> std::path::PathBuf {
        let path = dir.join("archive.zip");
        write_zip(&path, entries);
        path
    }

    fn upload(
        input: &Path,
        submitter: &FakeSubmitter,
        sink: &RecordingProgress,
    ) -> Result<super::UploadReport, super::UploadFailure> {
        let tracker = UploadTracker::new(sink);
        let result = run_upload(
            input,
            &ArchiveSchema::default(),
            &UploadOptions::default(),
            submitter,
            &tracker,
        );
        assert_eq!(tracker.phase(), UploadPhase::Idle);
        result
    }

    #[test]
    fn valid_zip_posts_exactly_one_merged_document() {
        let tmp = tempdir().expect("tempdir");
        let input = zip_with(tmp.path(), &sample_entries());
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        let report = upload(&input, &submitter, &sink).expect("upload");
        assert_eq!(report.source, SourceKind::Zip);
        assert_eq!(
            report.outcome,
            UploadOutcome::Accepted {
                message: "Archive stored".to_string()
            }
        );

        let calls = submitter.calls.borrow();
        assert_eq!(calls.len(), 1);
        let doc = calls[0].as_object().expect("object body");
        let mut keys: Vec<_> = doc.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["account", "follower", "following", "tweets"]);
        assert_eq!(
            calls[0]["tweets"],
            json!([{"tweet": {"id_str": "1", "full_text": "hi"}}])
        );
        assert_eq!(
            *sink.phases.borrow(),
            vec![
                UploadPhase::Uploading,
                UploadPhase::Processing,
                UploadPhase::Idle
            ]
        );
    }

    #[test]
    fn missing_zip_entry_never_submits() {
        let tmp = tempdir().expect("tempdir");
        let entries: Vec<_> = sample_entries()
            .into_iter()
            .filter(|(name, _)| *name != "data/account.js")
            .collect();
        let input = zip_with(tmp.path(), &entries);
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        let failure = upload(&input, &submitter, &sink).expect_err("missing account");
        assert!(matches!(failure.error, IngestError::MissingFile { .. }));
        assert_eq!(failure.origin, Some(SourceKind::Zip));
        assert!(submitter.calls.borrow().is_empty());
        assert_eq!(
            *sink.phases.borrow(),
            vec![UploadPhase::Uploading, UploadPhase::Idle]
        );
    }

    #[test]
    fn schema_violation_never_submits() {
        let tmp = tempdir().expect("tempdir");
        let entries: Vec<_> = sample_entries()
            .into_iter()
            .map(|(name, content)| {
                if name == "data/follower.js" {
                    (name, "window.YTD.follower.part0 = [{\"user\":{}}]".to_string())
                } else {
                    (name, content)
                }
            })
            .collect();
        let input = zip_with(tmp.path(), &entries);
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        let failure = upload(&input, &submitter, &sink).expect_err("schema");
        assert!(matches!(failure.error, IngestError::SchemaViolation { .. }));
        assert!(submitter.calls.borrow().is_empty());
        assert!(!sink.phases.borrow().contains(&UploadPhase::Processing));
    }

    #[test]
    fn legacy_tweet_name_is_enough() {
        let tmp = tempdir().expect("tempdir");
        let entries: Vec<_> = sample_entries()
            .into_iter()
            .map(|(name, content)| {
                if name == "data/tweets.js" {
                    ("data/tweet.js", content)
                } else {
                    (name, content)
                }
            })
            .collect();
        let input = zip_with(tmp.path(), &entries);
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        upload(&input, &submitter, &sink).expect("legacy alias accepted");
        assert_eq!(submitter.calls.borrow().len(), 1);
    }

    #[test]
    fn directory_missing_file_fails_like_zip() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("export");
        for (name, content) in sample_entries() {
            if name == "data/following.js" {
                continue;
            }
            let path = root.join(name);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(path, content).expect("write");
        }
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        let failure = upload(&root, &submitter, &sink).expect_err("missing following");
        assert_eq!(failure.origin, Some(SourceKind::Directory));
        assert!(submitter.calls.borrow().is_empty());
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let tmp = tempdir().expect("tempdir");
        let input = zip_with(tmp.path(), &sample_entries());
        let submitter = FakeSubmitter::replying(|| {
            Ok(SubmitResponse {
                status: 500,
                message: None,
            })
        });
        let sink = RecordingProgress::default();

        let report = upload(&input, &submitter, &sink).expect("report");
        assert_eq!(
            report.outcome,
            UploadOutcome::Rejected {
                http_status: 500,
                message: FALLBACK_REJECTION_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn transport_failure_keeps_digest_and_resets() {
        let tmp = tempdir().expect("tempdir");
        let input = zip_with(tmp.path(), &sample_entries());
        let submitter =
            FakeSubmitter::replying(|| Err(IngestError::Transport("connection refused".into())));
        let sink = RecordingProgress::default();

        let failure = upload(&input, &submitter, &sink).expect_err("transport");
        assert!(matches!(failure.error, IngestError::Transport(_)));
        assert!(failure.digest.is_some());
        assert_eq!(sink.phases.borrow().last(), Some(&UploadPhase::Idle));
    }

    #[test]
    fn unsupported_input_fails_before_detection_source_is_known() {
        let tmp = tempdir().expect("tempdir");
        let js = tmp.path().join("account.js");
        fs::write(&js, "window.YTD.account.part0 = []").expect("write");
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();

        let failure = upload(&js, &submitter, &sink).expect_err("unsupported");
        assert!(matches!(failure.error, IngestError::UnsupportedInput(_)));
        assert_eq!(failure.origin, None);
    }

    #[test]
    fn busy_tracker_refuses_without_submitting() {
        let tmp = tempdir().expect("tempdir");
        let input = zip_with(tmp.path(), &sample_entries());
        let submitter = FakeSubmitter::accepting();
        let sink = RecordingProgress::default();
        let tracker = UploadTracker::new(&sink);
        let active = tracker.start().expect("first upload starts");

        let failure = run_upload(
            &input,
            &ArchiveSchema::default(),
            &UploadOptions::default(),
            &submitter,
            &tracker,
        )
        .expect_err("busy");
        assert!(matches!(failure.error, IngestError::Busy));
        assert_eq!(failure.origin, None);
        assert!(submitter.calls.borrow().is_empty());
        assert_eq!(tracker.phase(), UploadPhase::Uploading);

        drop(active);
        assert_eq!(tracker.phase(), UploadPhase::Idle);
        assert_eq!(
            *sink.phases.borrow(),
            vec![UploadPhase::Uploading, UploadPhase::Idle]
        );
    }

    #[test]
    fn validate_only_reports_counts() {
        let tmp = tempdir().expect("tempdir");
        let input = zip_with(tmp.path(), &sample_entries());
        let (kind, validated) =
            run_validate(&input, &ArchiveSchema::default(), &UploadOptions::default())
                .expect("valid");
        assert_eq!(kind, SourceKind::Zip);
        assert_eq!(validated.counts().len(), 4);
    }
}
