use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured database path
pub const DATABASE_ENV: &str = "BARFINDER_DATABASE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BarfinderConfig {
    pub database: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("barfinder.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("db.sqlite")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BarfinderConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: BarfinderConfig = toml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BarfinderConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(())
}

/// Pick the database path: CLI flag, then environment, then config file,
/// then the default.
pub fn resolve_database_path(
    flag: Option<&Path>,
    env: Option<String>,
    config: Option<&BarfinderConfig>,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(path);
    }
    config
        .and_then(|c| c.database.as_deref())
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path)
}

/// [`resolve_database_path`] reading the override from the process environment
pub fn database_path(flag: Option<&Path>, config: Option<&BarfinderConfig>) -> PathBuf {
    resolve_database_path(flag, std::env::var(DATABASE_ENV).ok(), config)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
