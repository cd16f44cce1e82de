//! # Send Start Service
//!
//! `POST /api/send/start` turns the filled-in form into a running sender:
//!
//! 1.  **Validation**: the request is checked the way the form page checks it
//!     (spreadsheet chosen, phone column picked, template not empty, country
//!     code starting with `+`), then against the stored spreadsheet: the phone
//!     column must be one of its headers.
//!
//! 2.  **Handoff**: a `SendConfig` is written as JSON to the system temp
//!     directory and the sender executable is started with that path as its
//!     only argument.
//!
//! 3.  **Shutdown**: the server answers with the config path and any template
//!     placeholders that match no column, then stops shortly after.

use crate::config::FormSettings;
use crate::launcher::spawn::{spawn_sender, write_config};
use crate::launcher::state::FormState;
use crate::services::sheets::upload::resolve_sheet;
use actix_web::{web, HttpResponse, Responder};
use common::model::config::{SendConfig, CURRENT_SCHEMA_VERSION};
use common::model::template::unknown_placeholders;
use common::requests::{StartSendRequest, StartSendResponse};
use common::sheet::read_table;
use log::{info, warn};
use std::path::Path;

/// The Actix web handler for `POST /api/send/start`.
pub(crate) async fn process(
    state: web::Data<FormState>,
    payload: web::Json<StartSendRequest>,
) -> impl Responder {
    let result = match build_config(&state.settings, payload.into_inner()).await {
        Ok(prepared) => launch(&state.settings, prepared, &std::env::temp_dir()),
        Err(e) => return HttpResponse::BadRequest().body(e),
    };
    match result {
        Ok(response) => {
            state.request_shutdown();
            HttpResponse::Ok().json(response)
        }
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

/// A validated config plus the warnings to show the user.
#[derive(Debug)]
pub struct PreparedSend {
    pub config: SendConfig,
    pub unknown_placeholders: Vec<String>,
}

/// Validates the request and assembles the configuration record.
pub async fn build_config(
    settings: &FormSettings,
    req: StartSendRequest,
) -> Result<PreparedSend, String> {
    if req.sheet_id.trim().is_empty() {
        return Err("Please select an Excel file first!".to_string());
    }
    if req.phone_column.trim().is_empty() {
        return Err("Please select a phone column!".to_string());
    }
    let message_template = req.message_template.trim().to_string();
    if message_template.is_empty() {
        return Err("Message template cannot be empty!".to_string());
    }
    let country_code = req.country_code.trim().to_string();
    if !country_code.starts_with('+') {
        return Err("Country code must start with '+' (e.g., +92)".to_string());
    }

    let path = resolve_sheet(&settings.upload_dir, &req.sheet_id)?;
    let read_path = path.clone();
    let table = web::block(move || read_table(&read_path))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("Failed to load spreadsheet: {}", e))?;

    let config = SendConfig {
        schema_version: CURRENT_SCHEMA_VERSION,
        file_path: path,
        phone_column: req.phone_column,
        country_code,
        selected_vars: req.selected_vars,
        message_template,
    };
    config.validate().map_err(|e| e.to_string())?;
    config
        .validate_headers(&table.headers)
        .map_err(|e| e.to_string())?;

    let unknown = unknown_placeholders(&config.message_template, &table.headers);
    if !unknown.is_empty() {
        warn!("template placeholders without a column: {}", unknown.join(", "));
    }

    Ok(PreparedSend {
        config,
        unknown_placeholders: unknown,
    })
}

/// Writes the record into `config_dir` and starts the sender. The record is
/// removed again when the sender cannot be started.
fn launch(
    settings: &FormSettings,
    prepared: PreparedSend,
    config_dir: &Path,
) -> Result<StartSendResponse, String> {
    let config_path = write_config(&prepared.config, config_dir)?;
    if let Err(e) = spawn_sender(&settings.sender_path, &config_path) {
        if let Err(rm) = std::fs::remove_file(&config_path) {
            warn!("could not remove {}: {}", config_path.display(), rm);
        }
        return Err(e);
    }
    info!(
        "sending {} to column '{}' started",
        prepared.config.file_path.display(),
        prepared.config.phone_column
    );
    Ok(StartSendResponse {
        config_path: config_path.display().to_string(),
        unknown_placeholders: prepared.unknown_placeholders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use std::path::PathBuf;

    const SHEET_ID: &str = "0123456789abcdef0123456789abcdef.csv";

    fn settings(upload_dir: PathBuf) -> FormSettings {
        FormSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            upload_dir,
            sender_path: PathBuf::from("/nonexistent/sender"),
            theme: Theme::Dark,
            default_country_code: "+92".to_string(),
            default_template: String::new(),
        }
    }

    fn request() -> StartSendRequest {
        StartSendRequest {
            sheet_id: SHEET_ID.to_string(),
            phone_column: "Phone".to_string(),
            country_code: " +92 ".to_string(),
            selected_vars: vec!["Name".to_string()],
            message_template: "Hello {Name}, bill {Amount}, ref {Ref}\n".to_string(),
        }
    }

    fn upload_dir_with_sheet() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SHEET_ID),
            "Name,Phone,Amount\nAli,0300-1234567,500\n",
        )
        .unwrap();
        dir
    }

    #[actix_rt::test]
    async fn valid_request_builds_config() {
        let dir = upload_dir_with_sheet();
        let prepared = build_config(&settings(dir.path().to_path_buf()), request())
            .await
            .unwrap();

        assert_eq!(prepared.config.file_path, dir.path().join(SHEET_ID));
        assert_eq!(prepared.config.country_code, "+92");
        assert_eq!(
            prepared.config.message_template,
            "Hello {Name}, bill {Amount}, ref {Ref}"
        );
        assert_eq!(prepared.unknown_placeholders, vec!["Ref".to_string()]);
    }

    #[actix_rt::test]
    async fn country_code_without_plus_is_rejected() {
        let dir = upload_dir_with_sheet();
        let mut req = request();
        req.country_code = "92".to_string();
        let err = build_config(&settings(dir.path().to_path_buf()), req)
            .await
            .unwrap_err();
        assert!(err.starts_with("Country code must start with '+'"));
    }

    #[actix_rt::test]
    async fn empty_template_is_rejected() {
        let dir = upload_dir_with_sheet();
        let mut req = request();
        req.message_template = "   ".to_string();
        let err = build_config(&settings(dir.path().to_path_buf()), req)
            .await
            .unwrap_err();
        assert_eq!(err, "Message template cannot be empty!");
    }

    #[actix_rt::test]
    async fn phone_column_must_exist_in_sheet() {
        let dir = upload_dir_with_sheet();
        let mut req = request();
        req.phone_column = "Mobile".to_string();
        let err = build_config(&settings(dir.path().to_path_buf()), req)
            .await
            .unwrap_err();
        assert_eq!(err, "column 'Mobile' not found in spreadsheet");
    }

    #[actix_rt::test]
    async fn launch_fails_cleanly_without_sender() {
        let dir = upload_dir_with_sheet();
        let settings = settings(dir.path().to_path_buf());
        let prepared = build_config(&settings, request()).await.unwrap();
        let config_dir = tempfile::tempdir().unwrap();

        let err = launch(&settings, prepared, config_dir.path()).unwrap_err();
        assert!(err.starts_with("Sender executable not found"));
        assert_eq!(std::fs::read_dir(config_dir.path()).unwrap().count(), 0);
    }
}
