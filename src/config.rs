use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const KEY_ENV: &str = "AZURE_OPENAI_KEY";
pub const DEPLOYMENT_ENV: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const API_VERSION_ENV: &str = "AZURE_OPENAI_API_VERSION";
pub const CONFIG_ENV: &str = "AZPIPE_CONFIG";

pub const DEFAULT_DEPLOYMENT: &str = "gpt-5-nano";
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub timeout: Option<u64>,
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

/// Missing required variables, rendered with the export lines that fix them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariables(pub Vec<&'static str>);

impl fmt::Display for MissingVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: Missing environment variables: {}", self.0.join(", "))?;
        writeln!(f, "Please set:")?;
        writeln!(f, "  export {ENDPOINT_ENV}='https://<resource>.openai.azure.com'")?;
        writeln!(f, "  export {KEY_ENV}='<your-key>'")?;
        write!(f, "  export {DEPLOYMENT_ENV}='{DEFAULT_DEPLOYMENT}'  # optional")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    MissingVariables(MissingVariables),
    #[error("Cannot resolve config path: set {CONFIG_ENV} or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' does not contain a [profiles] section.", path.display())]
    NoProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", path.display())]
    ProfileNotFound { name: String, path: PathBuf },
    #[error("Invalid profile output '{0}'. Supported values: text, json.")]
    InvalidOutput(String),
}

/// Values taken from the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub deployment: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output: Option<OutputFormat>,
}

/// Everything known about the target deployment before credentials are required.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
    pub timeout_secs: Option<u64>,
    pub output: OutputFormat,
}

impl Settings {
    /// Resolves settings with CLI > environment > profile > default precedence.
    ///
    /// `lookup` stands in for the process environment so callers can inject
    /// a fixed set of variables.
    pub fn resolve<F>(
        lookup: F,
        profile: Option<&ProfileConfig>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_blank(lookup(name).as_deref());

        let profile_output = match profile.and_then(|profile| profile.output.as_deref()) {
            Some(raw) => Some(
                OutputFormat::parse(raw)
                    .ok_or_else(|| ConfigError::InvalidOutput(raw.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            endpoint: var(ENDPOINT_ENV)
                .or_else(|| profile.and_then(|p| non_blank(p.endpoint.as_deref()))),
            api_key: var(KEY_ENV),
            deployment: overrides
                .deployment
                .clone()
                .or_else(|| var(DEPLOYMENT_ENV))
                .or_else(|| profile.and_then(|p| non_blank(p.deployment.as_deref())))
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            api_version: var(API_VERSION_ENV)
                .or_else(|| profile.and_then(|p| non_blank(p.api_version.as_deref())))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout_secs: overrides
                .timeout_secs
                .or_else(|| profile.and_then(|profile| profile.timeout)),
            output: overrides.output.or(profile_output).unwrap_or_default(),
        })
    }

    /// Resolves from the real process environment, loading `profile` when named.
    pub fn from_env(profile: Option<&str>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let profile = profile.map(load_profile).transpose()?;
        Self::resolve(|name| env::var(name).ok(), profile.as_ref(), overrides)
    }

    /// Requires both endpoint and key; reports every missing one at once.
    pub fn into_azure_config(self) -> Result<AzureConfig, ConfigError> {
        match (self.endpoint, self.api_key) {
            (Some(endpoint), Some(api_key)) => Ok(AzureConfig {
                endpoint,
                api_key,
                deployment: self.deployment,
                api_version: self.api_version,
            }),
            (endpoint, api_key) => {
                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push(ENDPOINT_ENV);
                }
                if api_key.is_none() {
                    missing.push(KEY_ENV);
                }
                Err(ConfigError::MissingVariables(MissingVariables(missing)))
            }
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("output", &self.output)
            .finish()
    }
}

/// Connection details for one Azure OpenAI deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, ConfigError> {
    let path = config_path()?;
    let config = read_config_file(&path)?;
    let profiles = config
        .profiles
        .ok_or_else(|| ConfigError::NoProfiles { path: path.clone() })?;

    profiles
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path,
        })
}

/// Parses the config file and, when given, checks that the named profile is usable.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    let config = read_config_file(&path)?;

    if let Some(name) = profile {
        let profiles = config
            .profiles
            .as_ref()
            .ok_or_else(|| ConfigError::NoProfiles { path: path.clone() })?;
        let selected = profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
                path: path.clone(),
            })?;
        Settings::resolve(|_| None, Some(selected), &Overrides::default())?;
    } else if let Some(profiles) = &config.profiles {
        for selected in profiles.values() {
            Settings::resolve(|_| None, Some(selected), &Overrides::default())?;
        }
    }

    Ok(path)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("azpipe").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("azpipe")
        .join("config.toml"))
}
