//! Archive entries are JS assignments like `window.YTD.tweets.part0 = [ ... ]`.
//! Only the array literal on the right-hand side carries data.

use serde_json::Value;

use crate::error::IngestError;
use crate::ingest::LogicalFile;

fn is_identifier_path_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.')
}

/// Return the array literal of an export, or `None` when the text is neither a
/// bare array nor `<identifier.path> = [...]`.
pub fn strip_export_preamble(content: &str) -> Option<&str> {
    let text = content.trim_start_matches('\u{feff}').trim_start();
    let literal = if text.starts_with('[') {
        text
    } else {
        let (lhs, rhs) = text.split_once('=')?;
        let lhs = lhs.trim();
        if lhs.is_empty()
            || lhs.starts_with('.')
            || lhs.ends_with('.')
            || !lhs.chars().all(is_identifier_path_char)
        {
            return None;
        }
        let rhs = rhs.trim_start();
        if !rhs.starts_with('[') {
            return None;
        }
        rhs
    };

    let literal = literal.trim_end();
    Some(literal.strip_suffix(';').unwrap_or(literal).trim_end())
}

/// Parse an entry into its JSON value. Shape checks belong to the validator.
pub fn parse_payload(file: LogicalFile, content: &str) -> Result<Value, IngestError> {
    let literal = strip_export_preamble(content).ok_or_else(|| IngestError::MalformedJson {
        file,
        reason: "no array literal after export preamble".to_string(),
    })?;
    serde_json::from_str(literal).map_err(|err| IngestError::MalformedJson {
        file,
        reason: err.to_string(),
    })
}

/// First line of an entry, for diagnostics.
pub fn preview_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}
