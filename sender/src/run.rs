//! One complete sender run: config, contacts, browser, login, batch.

use crate::batch::BatchRunner;
use crate::browser::{BrowserSession, LaunchOptions};
use crate::dispatch::WhatsAppWeb;
use crate::error::SenderError;
use crate::failure_log::FailureLog;
use crate::session::wait_for_login;
use crate::timings::Timings;
use common::jobs::RunSummary;
use common::model::config::SendConfig;
use common::sheet::{read_table, Table};
use log::{info, warn};
use std::path::PathBuf;

pub struct RunOptions {
    pub config_path: PathBuf,
    /// Where screenshots and the failure log go.
    pub output_dir: PathBuf,
    pub launch: LaunchOptions,
    pub timings: Timings,
}

/// Loads the config and the spreadsheet, failing before any browser work if
/// either is unusable.
pub fn prepare(config_path: &std::path::Path) -> Result<(SendConfig, Table), SenderError> {
    info!("[1/4] loading configuration");
    let config = SendConfig::load(config_path)?;
    info!("- file: {}", config.file_path.display());
    info!("- phone column: {}", config.phone_column);
    info!("- country code: {}", config.country_code());
    info!("- variables: {} selected", config.selected_vars.len());

    info!("[2/4] reading contacts");
    let table = read_table(&config.file_path)?;
    config.validate_headers(&table.headers)?;
    let unknown = config.unknown_vars(&table.headers);
    if !unknown.is_empty() {
        warn!("selected variables not in spreadsheet: {}", unknown.join(", "));
    }
    info!("found {} contacts", table.len());
    Ok((config, table))
}

pub async fn run(options: &RunOptions) -> Result<RunSummary, SenderError> {
    let (config, table) = prepare(&options.config_path)?;

    info!("[3/4] setting up Chrome");
    let session = BrowserSession::launch(&options.launch).await?;
    let mut web = WhatsAppWeb::new(
        session.page().clone(),
        options.output_dir.clone(),
        options.timings.clone(),
    );

    let login = wait_for_login(&mut web, &options.timings).await;
    info!("login check: {:?}", login);

    info!("[4/4] sending messages");
    let failure_log = FailureLog::in_dir(&options.output_dir);
    let report = BatchRunner::new(&config, &table, &options.timings)
        .with_failure_log(&failure_log)
        .run(&mut web)
        .await;

    session.close().await;

    if report.summary.failed > 0 {
        info!("failed contacts logged to {}", failure_log.path().display());
    }
    Ok(report.summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn prepare_rejects_missing_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            format!(
                r#"{{"file_path": {:?}, "phone_column": "Phone", "message_template": "Hi"}}"#,
                dir.path().join("missing.xlsx")
            ),
        )
        .unwrap();

        let err = prepare(&config_path).unwrap_err();
        assert!(matches!(
            err,
            SenderError::Sheet(common::sheet::SheetError::NotFound(_))
        ));
    }

    #[test]
    fn prepare_rejects_unknown_phone_column() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("contacts.csv");
        let mut file = std::fs::File::create(&sheet).unwrap();
        writeln!(file, "Name,Mobile").unwrap();
        writeln!(file, "Ali,03001234567").unwrap();

        let config = SendConfig {
            schema_version: 1,
            file_path: sheet,
            phone_column: "Phone".to_string(),
            country_code: "+92".to_string(),
            selected_vars: vec!["Name".to_string()],
            message_template: "Hi {Name}".to_string(),
        };
        let config_path = dir.path().join("config.json");
        config.save(&config_path).unwrap();

        let err = prepare(&config_path).unwrap_err();
        assert_eq!(err.to_string(), "column 'Phone' not found in spreadsheet");
    }

    #[test]
    fn prepare_loads_valid_input() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("contacts.csv");
        std::fs::write(&sheet, "Name,Phone\nAli,0300-1234567\nSara,\n").unwrap();

        let config = SendConfig {
            schema_version: 1,
            file_path: sheet,
            phone_column: "Phone".to_string(),
            country_code: "+92".to_string(),
            selected_vars: vec!["Name".to_string()],
            message_template: "Hi {Name}".to_string(),
        };
        let config_path = dir.path().join("config.json");
        config.save(&config_path).unwrap();

        let (loaded, table) = prepare(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("Phone"), None);
    }
}
