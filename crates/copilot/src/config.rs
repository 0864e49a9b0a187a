//! Process configuration, read from the environment at startup.

use std::env;
use std::fmt::{self, Display};

/// Error raised when a required environment variable is absent.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => {
                write!(f, "environment variable {var} is not set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the process needs to talk to both services.
#[derive(Clone, Debug)]
pub struct Config {
    /// Main organization URI (`https://dev.azure.com/{org}`).
    pub org_uri: String,
    /// Code-search URI (`https://almsearch.dev.azure.com/{org}`).
    pub org_alm_uri: String,
    /// Graph URI (`https://vssps.dev.azure.com/{org}`).
    pub org_alt_uri: String,
    /// Personal access token.
    pub pat: String,
    /// Completion model name.
    pub model_name: String,
    /// Completion service base URL.
    pub endpoint: String,
    /// Completion service API key.
    pub api_key: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let require = |var: &'static str| {
            lookup(var).ok_or(ConfigError::Missing(var))
        };
        Ok(Self {
            org_uri: require("AZURE_DEVOPS_ORG_URI")?,
            org_alm_uri: require("AZURE_DEVOPS_ORG_ALM_URI")?,
            org_alt_uri: require("AZURE_DEVOPS_ORG_ALT_URI")?,
            pat: require("AZURE_DEVOPS_PAT")?,
            model_name: require("OAI_MODEL_NAME")?,
            endpoint: require("OAI_ENDPOINT")?,
            api_key: require("OAI_APIKEY")?,
        })
    }
}
