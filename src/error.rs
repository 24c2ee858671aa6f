use thiserror::Error;

use crate::ingest::LogicalFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Zip,
    Directory,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Directory => "directory",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("required file {path} not found in the {origin}")]
    MissingFile { path: String, origin: SourceKind },
    #[error("malformed zip archive: {0}")]
    MalformedZip(String),
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("malformed JSON in {file}: {reason}")]
    MalformedJson { file: LogicalFile, reason: String },
    #[error("invalid schema for {file}: {reason}")]
    SchemaViolation { file: LogicalFile, reason: String },
    #[error("upload transport failed: {0}")]
    Transport(String),
    #[error("config invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("an upload is already in progress")]
    Busy,
}

impl IngestError {
    /// Stable short code for audit lines and JSON reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedInput(_) => "unsupported_input",
            Self::MissingFile { .. } => "missing_file",
            Self::MalformedZip(_) => "malformed_zip",
            Self::Unreadable { .. } => "unreadable",
            Self::MalformedJson { .. } => "malformed_json",
            Self::SchemaViolation { .. } => "schema_violation",
            Self::Transport(_) => "transport",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Busy => "busy",
        }
    }

    /// True for failures raised before any network call could happen.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
