//! Startup settings for the form server.
//!
//! Everything is read once from the environment in `main.rs` and handed to the
//! handlers as `web::Data<FormState>`; nothing here is global or mutable.

use common::model::config::DEFAULT_COUNTRY_CODE;
use std::env;
use std::path::PathBuf;

const DEFAULT_TEMPLATE: &str = "Hello {Name},\nThis is an Automated WhatsApp Message.\nThankYou";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub host: String,
    pub port: u16,
    /// Uploaded spreadsheets are stored here, named by content hash.
    pub upload_dir: PathBuf,
    /// Executable started once the form is submitted.
    pub sender_path: PathBuf,
    pub theme: Theme,
    pub default_country_code: String,
    pub default_template: String,
}

impl FormSettings {
    /// Builds settings from `WA_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("WA_FORM_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("WA_FORM_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(8080);
        let upload_dir = lookup("WA_FORM_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("whatsapp_automation_uploads"));
        let sender_path = lookup("WA_SENDER_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(default_sender_path);
        let theme = lookup("WA_FORM_THEME")
            .and_then(|t| Theme::parse(&t))
            .unwrap_or(Theme::Dark);
        let default_country_code = lookup("WA_DEFAULT_COUNTRY_CODE")
            .filter(|c| c.trim().starts_with('+'))
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());

        Self {
            host,
            port,
            upload_dir,
            sender_path,
            theme,
            default_country_code,
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// The sender binary next to the running form executable.
fn default_sender_path() -> PathBuf {
    let file_name = format!("sender{}", env::consts::EXE_SUFFIX);
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
