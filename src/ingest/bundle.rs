use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::ingest::LogicalFile;
use crate::ingest::payload::{parse_payload, preview_line};
use crate::ingest::schema::{ArchiveSchema, validate_value};

/// Raw text of each extracted entry, keyed by logical file.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBundle {
    entries: BTreeMap<LogicalFile, String>,
}

impl ArchiveBundle {
    pub fn insert(&mut self, file: LogicalFile, content: String) {
        self.entries.insert(file, content);
    }

    pub fn get(&self, file: LogicalFile) -> Option<&str> {
        self.entries.get(&file).map(String::as_str)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().map(|file| file.name()).collect()
    }

    /// Parse and validate every extracted entry in logical order.
    pub fn validate(
        &self,
        schema: &ArchiveSchema,
        strict_fields: bool,
    ) -> Result<ValidatedArchive, IngestError> {
        let mut files = BTreeMap::new();
        for file in LogicalFile::ALL {
            let Some(content) = self.get(file) else {
                continue;
            };
            debug!(file = %file, first_line = preview_line(content), "validating content");
            let Some(file_schema) = schema.file(file) else {
                return Err(IngestError::SchemaViolation {
                    file,
                    reason: "no schema declared".to_string(),
                });
            };

            let value = parse_payload(file, content).inspect_err(|err| {
                warn!(file = %file, error = %err, "failed to parse archive file");
            })?;
            validate_value(file, &value, file_schema, strict_fields).inspect_err(|err| {
                warn!(file = %file, error = %err, "archive file failed validation");
            })?;

            if let Value::Array(items) = value {
                files.insert(file, items);
            }
        }
        Ok(ValidatedArchive { files })
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedArchive {
    files: BTreeMap<LogicalFile, Vec<Value>>,
}

impl ValidatedArchive {
    pub fn counts(&self) -> Vec<(LogicalFile, usize)> {
        self.files
            .iter()
            .map(|(file, items)| (*file, items.len()))
            .collect()
    }

    /// The request body: one key per logical file, mapped to its parsed array.
    pub fn to_document(&self) -> Value {
        let mut out = Map::new();
        for (file, items) in &self.files {
            out.insert(file.name().to_string(), Value::Array(items.clone()));
        }
        Value::Object(out)
    }
}

pub fn document_digest(document: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
