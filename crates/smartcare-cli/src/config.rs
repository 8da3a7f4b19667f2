use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smartcare_client::Language;

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
    /// Notification language used until the signed-in user's preference is known.
    pub language: Option<String>,
    pub log_level: Option<String>,
}

impl ProfileConfig {
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .as_deref()
            .and_then(OutputFormat::from_name)
            .unwrap_or_default()
    }

    pub fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(Language::from_tag)
            .unwrap_or_default()
    }

    /// Apply a `config set` key. Values are checked before they are stored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("server must be an http(s) URL, got \"{value}\"");
                }
                self.server = Some(value.trim_end_matches('/').to_string());
            }
            "format" => {
                OutputFormat::from_name(value)
                    .with_context(|| format!("unknown format \"{value}\" (json, yaml, table)"))?;
                self.format = Some(value.to_string());
            }
            "language" => {
                Language::from_tag(value)
                    .with_context(|| format!("unsupported language \"{value}\" (ko, en)"))?;
                self.language = Some(value.to_string());
            }
            "log_level" => self.log_level = Some(value.to_string()),
            other => anyhow::bail!(
                "Unknown config key: {other}. Valid keys: server, format, language, log_level"
            ),
        }
        Ok(())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// `~/.smartcare`, created on first use.
pub fn smartcare_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".smartcare");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(smartcare_dir()?.join("config.toml"))
}

pub fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(cfg)
}

pub fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(&config_path()?)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

pub fn resolve_server(
    cli_server: &Option<String>,
    profile: &str,
    cfg: &ProfileConfig,
) -> Result<String> {
    // 1. --server flag / SMARTCARE_URL env
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    // 2. config.toml profile
    if let Some(s) = &cfg.server {
        return Ok(s.clone());
    }
    // 3. Stored credentials for this profile
    if let Ok(Some(server)) = crate::credentials::stored_server(profile) {
        return Ok(server);
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set SMARTCARE_URL env var, or run: smartcare config set server <url>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_roundtrip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut ward = ProfileConfig::default();
        ward.set("server", "http://ward.local:5000/").unwrap();
        ward.set("language", "en").unwrap();
        save_profile_to(&path, "ward", &ward).unwrap();
        save_profile_to(&path, "default", &ProfileConfig::default()).unwrap();

        let all = load_all_from(&path).unwrap();
        assert_eq!(all.len(), 2);
        let loaded = &all["ward"];
        assert_eq!(loaded.server.as_deref(), Some("http://ward.local:5000"));
        assert_eq!(loaded.language(), Language::En);
        assert_eq!(loaded.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_set_rejects_unknown_values() {
        let mut cfg = ProfileConfig::default();
        assert!(cfg.set("server", "ward.local").is_err());
        assert!(cfg.set("format", "xml").is_err());
        assert!(cfg.set("language", "fr").is_err());
        assert!(cfg.set("color", "red").is_err());
        assert_eq!(cfg, ProfileConfig::default());
    }

    #[test]
    fn test_language_defaults_to_korean() {
        assert_eq!(ProfileConfig::default().language(), Language::Ko);
    }

    #[test]
    fn test_missing_config_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_all_from(&dir.path().join("none.toml")).unwrap().is_empty());
    }

    #[test]
    fn test_cli_server_wins() {
        let cfg = ProfileConfig {
            server: Some("http://profile".into()),
            ..Default::default()
        };
        let server = resolve_server(&Some("http://flag".into()), "default", &cfg).unwrap();
        assert_eq!(server, "http://flag");
        let server = resolve_server(&None, "default", &cfg).unwrap();
        assert_eq!(server, "http://profile");
    }
}
