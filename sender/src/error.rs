use common::model::config::ConfigError;
use common::sheet::SheetError;

/// Errors that abort a whole run. Per-contact failures never become one of
/// these; they are retried and then counted in the run summary.
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot load contacts: {0}")]
    Sheet(#[from] SheetError),

    #[error("browser could not be started: {0}")]
    BrowserLaunch(String),
}
