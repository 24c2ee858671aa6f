use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BirdvaultPaths {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub logs_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_path(var: &str) -> Option<PathBuf> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(PathBuf::from(v.trim())),
        _ => None,
    }
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    env_path(var).unwrap_or(fallback)
}

pub fn resolve_paths() -> Result<BirdvaultPaths> {
    let home = match env_path("BIRDVAULT_HOME") {
        Some(home) => home,
        None => required_home_dir()?.join(".birdvault"),
    };

    let db_path = env_or_default_path("BIRDVAULT_DB", home.join("archive.sqlite"));
    let logs_dir = env_or_default_path("BIRDVAULT_LOGS_DIR", home.join("logs"));

    Ok(BirdvaultPaths {
        home,
        db_path,
        logs_dir,
    })
}
