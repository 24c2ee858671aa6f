use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::IngestError;
use crate::ingest::LogicalFile;

/// Expected shape of one archive file: every element wraps its record under
/// `wrapper`, and the record declares `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSchema {
    pub wrapper: &'static str,
    pub fields: &'static [&'static str],
}

const ACCOUNT_FIELDS: &[&str] = &[
    "email",
    "createdVia",
    "username",
    "accountId",
    "createdAt",
    "accountDisplayName",
];

const TWEET_FIELDS: &[&str] = &[
    "edit_info",
    "retweeted",
    "source",
    "entities",
    "display_text_range",
    "favorite_count",
    "id_str",
    "truncated",
    "retweet_count",
    "id",
    "created_at",
    "favorited",
    "full_text",
    "lang",
];

const RELATION_FIELDS: &[&str] = &["accountId", "userLink"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSchema {
    files: BTreeMap<LogicalFile, FileSchema>,
}

impl Default for ArchiveSchema {
    fn default() -> Self {
        let files = BTreeMap::from([
            (
                LogicalFile::Account,
                FileSchema {
                    wrapper: "account",
                    fields: ACCOUNT_FIELDS,
                },
            ),
            (
                LogicalFile::Tweets,
                FileSchema {
                    wrapper: "tweet",
                    fields: TWEET_FIELDS,
                },
            ),
            (
                LogicalFile::Follower,
                FileSchema {
                    wrapper: "follower",
                    fields: RELATION_FIELDS,
                },
            ),
            (
                LogicalFile::Following,
                FileSchema {
                    wrapper: "following",
                    fields: RELATION_FIELDS,
                },
            ),
        ]);
        Self { files }
    }
}

impl ArchiveSchema {
    pub fn file(&self, file: LogicalFile) -> Option<&FileSchema> {
        self.files.get(&file)
    }
}

fn violation(file: LogicalFile, reason: String) -> IngestError {
    IngestError::SchemaViolation { file, reason }
}

/// Presence-only check. The first failing element fails the whole file.
pub fn validate_value(
    file: LogicalFile,
    value: &Value,
    schema: &FileSchema,
    strict_fields: bool,
) -> Result<(), IngestError> {
    let Some(items) = value.as_array() else {
        return Err(violation(file, "payload is not an array".to_string()));
    };

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(violation(
                file,
                format!("element {index} is not an object"),
            ));
        };
        let Some(record) = object.get(schema.wrapper) else {
            return Err(violation(
                file,
                format!("element {index} missing key `{}`", schema.wrapper),
            ));
        };
        if !strict_fields {
            continue;
        }
        let Some(record) = record.as_object() else {
            return Err(violation(
                file,
                format!("element {index} `{}` is not an object", schema.wrapper),
            ));
        };
        if let Some(missing) = schema.fields.iter().find(|f| !record.contains_key(**f)) {
            return Err(violation(
                file,
                format!("element {index} missing field `{}.{missing}`", schema.wrapper),
            ));
        }
    }

    Ok(())
}
