#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Defaults match the browser layout: `formFields` and `formResponses` in
//! `localStorage`, with the empty-table teardown enabled. A JSON document can
//! override any subset, and the `FORMWRIGHT_*` environment variables override
//! that in turn:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FORMWRIGHT_FIELDS_KEY` | `fields_key` |
//! | `FORMWRIGHT_RESPONSES_KEY` | `responses_key` |
//! | `FORMWRIGHT_EMPTY_TABLE_POLICY` | `empty_table_policy` (`teardown` / `preserve`) |
//! | `FORMWRIGHT_STORAGE_AREA` | `storage_area` (`local` / `session`) |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default key for the field collection.
pub const DEFAULT_FIELDS_KEY: &str = "formFields";
/// Default key for the response collection.
pub const DEFAULT_RESPONSES_KEY: &str = "formResponses";

/// What happens when the response table is drawn with an empty collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTablePolicy {
    /// Clear both collections and wipe the store.
    #[default]
    Teardown,
    /// Leave state alone; the table is simply absent.
    Preserve,
}

impl FromStr for EmptyTablePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teardown" => Ok(Self::Teardown),
            "preserve" => Ok(Self::Preserve),
            _ => Err(ConfigError::InvalidValue {
                key: "empty_table_policy",
                value: s.to_owned(),
            }),
        }
    }
}

/// Which browser storage area backs the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    #[default]
    Local,
    Session,
}

impl FromStr for StorageArea {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "session" => Ok(Self::Session),
            _ => Err(ConfigError::InvalidValue {
                key: "storage_area",
                value: s.to_owned(),
            }),
        }
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub fields_key: String,
    pub responses_key: String,
    pub empty_table_policy: EmptyTablePolicy,
    pub storage_area: StorageArea,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fields_key: DEFAULT_FIELDS_KEY.to_owned(),
            responses_key: DEFAULT_RESPONSES_KEY.to_owned(),
            empty_table_policy: EmptyTablePolicy::default(),
            storage_area: StorageArea::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: EmptyTablePolicy) -> Self {
        self.empty_table_policy = policy;
        self
    }

    /// Apply `FORMWRIGHT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `FORMWRIGHT_*` overrides from an arbitrary lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("FORMWRIGHT_FIELDS_KEY").filter(|v| !v.is_empty()) {
            self.fields_key = key;
        }
        if let Some(key) = lookup("FORMWRIGHT_RESPONSES_KEY").filter(|v| !v.is_empty()) {
            self.responses_key = key;
        }
        if let Some(policy) = lookup("FORMWRIGHT_EMPTY_TABLE_POLICY") {
            self.empty_table_policy = policy.parse()?;
        }
        if let Some(area) = lookup("FORMWRIGHT_STORAGE_AREA") {
            self.storage_area = area.parse()?;
        }
        Ok(self)
    }
}

/// Errors raised while building a [`SessionConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document did not parse.
    Parse(serde_json::Error),
    /// A setting had an unrecognized value.
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid session config: {e}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::InvalidValue { .. } => None,
        }
    }
}
