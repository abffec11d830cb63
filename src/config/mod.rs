use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

pub const API_BASE_ENV: &str = "API_BASE";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub api_base: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub storage: Option<String>,
    pub page_size: Option<u32>,
    pub debounce_ms: Option<u64>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

fn app_dir() -> Option<PathBuf> {
    Some(home_dir()?.join(".fayda-admin"))
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(app_dir()?.join("config.yml"))
}

pub fn default_storage_path() -> PathBuf {
    app_dir()
        .map(|dir| dir.join("storage.json"))
        .unwrap_or_else(|| PathBuf::from(".fayda-admin-storage.json"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Base URL from the process environment (a `.env` file is loaded first by the binary).
pub fn api_base_from_env() -> Option<String> {
    env::var(API_BASE_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# fayda-admin config
#
# Location (default):
#   ~/.fayda-admin/config.yml

# API (API_BASE in the environment or a .env file takes precedence)
# api_base: https://api.example.com

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Session storage (holds the bearer token)
# storage: ~/.fayda-admin/storage.json

# Listing
page_size: 10
debounce_ms: 500

# Output styling
no_color: false
"#
    .to_string()
}

pub fn write_default_config_file(path: &PathBuf, force: bool) -> Result<bool, String> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "failed to create config directory '{}': {e}",
                parent.display()
            )
        })?;
    }
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
