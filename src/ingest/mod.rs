pub mod audit;
pub mod bundle;
pub mod payload;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod source;
pub mod submit;

use serde::Serialize;

/// Directory prefix every required entry lives under.
pub const DATA_DIR: &str = "data";

/// The four files an archive must carry, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalFile {
    Account,
    Tweets,
    Follower,
    Following,
}

impl LogicalFile {
    pub const ALL: [LogicalFile; 4] = [
        LogicalFile::Account,
        LogicalFile::Tweets,
        LogicalFile::Follower,
        LogicalFile::Following,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Tweets => "tweets",
            Self::Follower => "follower",
            Self::Following => "following",
        }
    }

    /// Relative path of the entry inside the archive or directory.
    pub fn relative_path(self) -> String {
        format!("{DATA_DIR}/{}.js", self.name())
    }

    /// Older exports name the tweets file `tweet.js`.
    pub fn legacy_alias(self) -> Option<String> {
        match self {
            Self::Tweets => Some(format!("{DATA_DIR}/tweet.js")),
            _ => None,
        }
    }

    pub fn candidate_paths(self) -> Vec<String> {
        let mut out = vec![self.relative_path()];
        out.extend(self.legacy_alias());
        out
    }
}

impl std::fmt::Display for LogicalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::LogicalFile;

    #[test]
    fn tweets_has_legacy_alias_after_canonical_path() {
        assert_eq!(
            LogicalFile::Tweets.candidate_paths(),
            vec!["data/tweets.js".to_string(), "data/tweet.js".to_string()]
        );
    }

    #[test]
    fn other_files_have_single_candidate() {
        assert_eq!(
            LogicalFile::Following.candidate_paths(),
            vec!["data/following.js".to_string()]
        );
        assert!(LogicalFile::Account.legacy_alias().is_none());
    }
}
