use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub endpoint: Option<String>,
    pub format: Option<String>,
    pub client_version: Option<String>,
}

impl ProfileConfig {
    /// Sets one key by name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(value.to_string()),
            "format" => {
                OutputFormat::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid format {value:?}: {e}"))?;
                self.format = Some(value.to_lowercase());
            }
            "client_version" => self.client_version = Some(value.to_string()),
            other => anyhow::bail!(
                "Unknown config key: {other}. Valid keys: endpoint, format, client_version"
            ),
        }
        Ok(())
    }

    /// Stored output format, if any and valid.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// `~/.esus`, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".esus");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all() -> Result<ConfigFile> {
    load_all_from(&config_path()?)
}

pub fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    Ok(load_all()?.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

pub fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn resolve_endpoint(cli_endpoint: Option<&str>, profile: &str) -> Result<String> {
    // 1. --endpoint flag / ESUS_ENDPOINT env
    if let Some(e) = cli_endpoint {
        return Ok(e.to_string());
    }
    // 2. config.toml profile
    let cfg = load_profile(profile)?;
    if let Some(e) = cfg.endpoint {
        return Ok(e);
    }
    // 3. Stored credentials for this profile
    if let Ok(Some(creds)) = crate::credentials::load_credentials(profile) {
        return Ok(creds.endpoint);
    }
    anyhow::bail!(
        "No endpoint configured. Use --endpoint, set ESUS_ENDPOINT env var, or run: esus config set endpoint <url>"
    )
}
