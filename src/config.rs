use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::IngestError;
use crate::query::tweets::{DEFAULT_FIRST_TWEETS_LIMIT, DEFAULT_TOP_TWEETS_LIMIT};

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "/api/upload-archive";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_endpoint_path() -> String {
    DEFAULT_UPLOAD_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            timeout_secs: default_timeout_secs(),
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub first_tweets_limit: usize,
    pub top_tweets_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            first_tweets_limit: DEFAULT_FIRST_TWEETS_LIMIT,
            top_tweets_limit: DEFAULT_TOP_TWEETS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationConfig {
    #[serde(default)]
    pub strict_fields: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BirdvaultConfig {
    pub upload: UploadConfig,
    pub query: QueryConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialBirdvaultConfig {
    upload: Option<UploadConfig>,
    query: Option<QueryConfig>,
    validation: Option<ValidationConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_optional(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

fn invalid(message: &str) -> anyhow::Error {
    IngestError::InvalidConfig(message.to_string()).into()
}

pub fn validate(cfg: &BirdvaultConfig) -> Result<()> {
    let base = cfg.upload.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(invalid(
            "upload base url must start with http:// or https://",
        ));
    }
    if !cfg.upload.endpoint_path.starts_with('/') {
        return Err(invalid("upload endpoint path must start with `/`"));
    }
    if cfg.upload.timeout_secs == 0 {
        return Err(invalid("upload timeout must be >= 1 second"));
    }
    if cfg.query.first_tweets_limit == 0 || cfg.query.top_tweets_limit == 0 {
        return Err(invalid("query limits must be >= 1"));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("BIRDVAULT_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".birdvault").join("birdvault.toml"))
}

fn merge_file_config(base: &mut BirdvaultConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    merge_toml(base, &raw)
        .map_err(|err| anyhow!("failed to parse birdvault config {}: {err}", path.display()))
}

fn merge_toml(base: &mut BirdvaultConfig, raw: &str) -> Result<(), toml::de::Error> {
    let parsed: PartialBirdvaultConfig = toml::from_str(raw)?;
    if let Some(upload) = parsed.upload {
        base.upload = upload;
    }
    if let Some(query) = parsed.query {
        base.query = query;
    }
    if let Some(validation) = parsed.validation {
        base.validation = validation;
    }
    Ok(())
}

fn apply_env(cfg: &mut BirdvaultConfig) {
    cfg.upload.base_url = env_or_string("BIRDVAULT_UPLOAD_BASE_URL", &cfg.upload.base_url);
    cfg.upload.endpoint_path =
        env_or_string("BIRDVAULT_UPLOAD_ENDPOINT", &cfg.upload.endpoint_path);
    cfg.upload.timeout_secs =
        env_or_u64("BIRDVAULT_UPLOAD_TIMEOUT_SECS", cfg.upload.timeout_secs);
    cfg.upload.session_cookie = env_or_optional(
        "BIRDVAULT_SESSION_COOKIE",
        cfg.upload.session_cookie.take(),
    );
    cfg.query.first_tweets_limit =
        env_or_usize("BIRDVAULT_FIRST_TWEETS_LIMIT", cfg.query.first_tweets_limit);
    cfg.query.top_tweets_limit =
        env_or_usize("BIRDVAULT_TOP_TWEETS_LIMIT", cfg.query.top_tweets_limit);
    cfg.validation.strict_fields =
        env_or_bool("BIRDVAULT_STRICT_FIELDS", cfg.validation.strict_fields);
}

pub fn load_config() -> Result<BirdvaultConfig> {
    let mut cfg = BirdvaultConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
