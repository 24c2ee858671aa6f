use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const AUDIT_FILE_NAME: &str = "upload-audit.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAuditEvent {
    pub at: String,
    pub source: String,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_sha256: Option<String>,
}

impl UploadAuditEvent {
    pub fn now(source: &str, status: &str, message: &str, digest: Option<String>) -> Self {
        Self {
            at: chrono::Utc::now().to_rfc3339(),
            source: source.to_string(),
            status: status.to_string(),
            message: message.to_string(),
            document_sha256: digest,
        }
    }
}

pub fn audit_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(AUDIT_FILE_NAME)
}

pub fn append_event(logs_dir: &Path, event: &UploadAuditEvent) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;

    let line = format!("{}\n", serde_json::to_string(event)?);
    let path = audit_path(logs_dir);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("failed to append {}", path.display()))?;
    Ok(path)
}

pub fn read_events(logs_dir: &Path) -> Result<Vec<UploadAuditEvent>> {
    let path = audit_path(logs_dir);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut out = Vec::new();
    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: UploadAuditEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("failed to parse audit line in {}", path.display()))?;
        out.push(event);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{UploadAuditEvent, append_event, read_events};
    use tempfile::tempdir;

    #[test]
    fn appends_one_line_per_event() {
        let tmp = tempdir().expect("tempdir");
        let logs = tmp.path().join("logs");
        append_event(
            &logs,
            &UploadAuditEvent::now("zip", "accepted", "Archive stored", Some("ab".to_string())),
        )
        .expect("append");
        append_event(
            &logs,
            &UploadAuditEvent::now("directory", "failed", "missing file", None),
        )
        .expect("append");

        let events = read_events(&logs).expect("read");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, "accepted");
        assert_eq!(events[0].document_sha256.as_deref(), Some("ab"));
        assert_eq!(events[1].source, "directory");
        assert!(events[1].document_sha256.is_none());
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = tempdir().expect("tempdir");
        assert!(read_events(tmp.path()).expect("read").is_empty());
    }
}
