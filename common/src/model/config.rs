//! The configuration record handed from the form to the sender.
//!
//! The form writes exactly one `SendConfig` as JSON and passes its path to the
//! sender process on the command line. The record is never modified after it is
//! written; the sender reads it once at startup.
//!
//! The file carries a `schema_version` so that a sender built from an older
//! checkout refuses a record it does not understand instead of guessing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Newest record layout this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Country code used when the record does not carry one.
pub const DEFAULT_COUNTRY_CODE: &str = "+92";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("country code must start with '+' (e.g. +92), got '{0}'")]
    CountryCode(String),

    #[error("phone column must not be empty")]
    MissingPhoneColumn,

    #[error("message template must not be empty")]
    EmptyTemplate,

    #[error("spreadsheet path must not be empty")]
    MissingFilePath,

    #[error("column '{0}' not found in spreadsheet")]
    UnknownColumn(String),
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

/// Everything the sender needs to run one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Path of the spreadsheet holding one contact per row.
    pub file_path: PathBuf,
    /// Header of the column holding the phone numbers.
    pub phone_column: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Columns whose `{Name}` placeholders get substituted.
    #[serde(default)]
    pub selected_vars: Vec<String>,
    pub message_template: String,
}

impl SendConfig {
    /// Reads and validates a record from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SendConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the record as pretty JSON, the same layout `load` reads back.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the invariants that do not need the spreadsheet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if self.file_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingFilePath);
        }
        if self.phone_column.trim().is_empty() {
            return Err(ConfigError::MissingPhoneColumn);
        }
        let code = self.country_code.trim();
        if code.len() < 2 || !code.starts_with('+') {
            return Err(ConfigError::CountryCode(self.country_code.clone()));
        }
        if self.message_template.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate);
        }
        Ok(())
    }

    /// Checks that the phone column exists among the spreadsheet headers.
    ///
    /// Selected variables that are not headers are not an error; the renderer
    /// leaves their placeholders untouched.
    pub fn validate_headers(&self, headers: &[String]) -> Result<(), ConfigError> {
        if !headers.iter().any(|h| h == &self.phone_column) {
            return Err(ConfigError::UnknownColumn(self.phone_column.clone()));
        }
        Ok(())
    }

    /// Selected variables that do not name a spreadsheet column.
    pub fn unknown_vars<'a>(&'a self, headers: &[String]) -> Vec<&'a str> {
        self.selected_vars
            .iter()
            .filter(|v| !headers.contains(v))
            .map(String::as_str)
            .collect()
    }

    /// Country code with surrounding whitespace removed.
    pub fn country_code(&self) -> &str {
        self.country_code.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SendConfig {
        SendConfig {
            schema_version: CURRENT_SCHEMA_VERSION,
            file_path: PathBuf::from("contacts.xlsx"),
            phone_column: "Phone".to_string(),
            country_code: "+92".to_string(),
            selected_vars: vec!["Name".to_string()],
            message_template: "Hello {Name}".to_string(),
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{
            "file_path": "contacts.xlsx",
            "phone_column": "Phone",
            "message_template": "Hi"
        }"#;
        let config: SendConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.country_code, "+92");
        assert!(config.selected_vars.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn country_code_needs_plus_prefix() {
        let mut config = sample();
        config.country_code = "92".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::CountryCode(_))));

        config.country_code = "+".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::CountryCode(_))));

        config.country_code = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::CountryCode(_))));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut config = sample();
        config.schema_version = CURRENT_SCHEMA_VERSION + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn blank_template_and_phone_column_are_rejected() {
        let mut config = sample();
        config.message_template = "  \n ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTemplate)));

        let mut config = sample();
        config.phone_column = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPhoneColumn)
        ));
    }

    #[test]
    fn phone_column_must_be_a_header() {
        let config = sample();
        let headers = vec!["Name".to_string(), "Mobile".to_string()];
        assert!(matches!(
            config.validate_headers(&headers),
            Err(ConfigError::UnknownColumn(c)) if c == "Phone"
        ));

        let headers = vec!["Name".to_string(), "Phone".to_string()];
        assert!(config.validate_headers(&headers).is_ok());
    }

    #[test]
    fn unknown_vars_lists_only_missing_columns() {
        let mut config = sample();
        config.selected_vars = vec!["Name".to_string(), "City".to_string()];
        let headers = vec!["Name".to_string(), "Phone".to_string()];
        assert_eq!(config.unknown_vars(&headers), vec!["City"]);
    }

    #[test]
    fn save_then_load_keeps_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = sample();
        config.save(&path).unwrap();
        assert_eq!(SendConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SendConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
