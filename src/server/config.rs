use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::server::{
    error::{config::ConfigError, AppError},
    model::backup::{BackupSettings, RewriteMode},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_BACKUPS_DIR: &str = "backups";
const DEFAULT_BACKUP_EXTENSIONS: &str = "tdb";
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 300;
const DEFAULT_RETENTION_DAYS: u64 = 30;
const DEFAULT_MAX_UPLOAD_MB: usize = 1024;

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,

    pub assets_dir: PathBuf,
    pub backups_dir: PathBuf,
    pub scratch_dir: PathBuf,

    pub backup_extensions: Vec<String>,
    pub rewrite_mode: RewriteMode,
    pub step_timeout: Duration,
    pub retention_days: u64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::from_lookup(|name| std::env::var(name).ok())?)
    }

    /// Builds the configuration from any variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backup_extensions: Vec<String> = lookup("BACKUP_EXTENSIONS")
            .unwrap_or_else(|| DEFAULT_BACKUP_EXTENSIONS.to_string())
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if backup_extensions.is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                name: "BACKUP_EXTENSIONS".to_string(),
                value: lookup("BACKUP_EXTENSIONS").unwrap_or_default(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            assets_dir: lookup("ASSETS_DIR")
                .unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string())
                .into(),
            backups_dir: lookup("BACKUPS_DIR")
                .unwrap_or_else(|| DEFAULT_BACKUPS_DIR.to_string())
                .into(),
            scratch_dir: lookup("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            backup_extensions,
            rewrite_mode: parse_or(&lookup, "BACKUP_REWRITE_MODE", RewriteMode::default())?,
            step_timeout: Duration::from_secs(parse_or(
                &lookup,
                "BACKUP_STEP_TIMEOUT_SECS",
                DEFAULT_STEP_TIMEOUT_SECS,
            )?),
            retention_days: parse_or(&lookup, "BACKUP_RETENTION_DAYS", DEFAULT_RETENTION_DAYS)?,
            max_upload_bytes: parse_or(&lookup, "BACKUP_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?
                .saturating_mul(1024 * 1024),
        })
    }

    pub fn backup_settings(&self) -> BackupSettings {
        BackupSettings {
            assets_dir: self.assets_dir.clone(),
            backups_dir: self.backups_dir.clone(),
            scratch_dir: self.scratch_dir.clone(),
            extensions: self.backup_extensions.clone(),
            rewrite_mode: self.rewrite_mode,
            step_timeout: self.step_timeout,
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    /// Age after which backup archives are pruned.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config(&[("DATABASE_URL", "sqlite://backoffice.db?mode=rwc")]).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.backups_dir, PathBuf::from("backups"));
        assert_eq!(config.backup_extensions, vec!["tdb"]);
        assert_eq!(config.rewrite_mode, RewriteMode::Text);
        assert_eq!(config.step_timeout, Duration::from_secs(300));
        assert_eq!(config.retention(), Duration::from_secs(30 * 24 * 60 * 60));
    }

    #[test]
    fn requires_database_url() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::MissingEnvVar(name)) if name == "DATABASE_URL"
        ));
    }

    #[test]
    fn parses_overrides() {
        let config = config(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BACKUP_EXTENSIONS", " .TDB, bak ,"),
            ("BACKUP_REWRITE_MODE", "structural"),
            ("BACKUP_STEP_TIMEOUT_SECS", "15"),
            ("BACKUP_MAX_UPLOAD_MB", "2"),
        ])
        .unwrap();

        assert_eq!(config.backup_extensions, vec!["tdb", "bak"]);
        assert_eq!(config.rewrite_mode, RewriteMode::Structural);
        assert_eq!(config.step_timeout, Duration::from_secs(15));
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn rejects_unparsable_values() {
        assert!(matches!(
            config(&[("DATABASE_URL", "x"), ("BACKUP_RETENTION_DAYS", "forever")]),
            Err(ConfigError::InvalidEnvVar { name, .. }) if name == "BACKUP_RETENTION_DAYS"
        ));
        assert!(matches!(
            config(&[("DATABASE_URL", "x"), ("BACKUP_EXTENSIONS", " , ")]),
            Err(ConfigError::InvalidEnvVar { name, .. }) if name == "BACKUP_EXTENSIONS"
        ));
    }
}
