use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/send/start`.
///
/// `sheet_id` is the id returned by the upload endpoint; the form server
/// resolves it to the stored spreadsheet path before writing the config record.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct StartSendRequest {
    pub sheet_id: String,
    pub phone_column: String,
    pub country_code: String,
    #[serde(default)]
    pub selected_vars: Vec<String>,
    pub message_template: String,
}

/// Response of the upload endpoint: what the form needs to populate its
/// phone-column picker and variable checkboxes.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SheetSummary {
    pub sheet_id: String,
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: usize,
}

/// Response of `POST /api/send/start`.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct StartSendResponse {
    pub config_path: String,
    /// Placeholders in the template that name no spreadsheet column.
    pub unknown_placeholders: Vec<String>,
}

/// Defaults the form page reads at load time.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct FormDefaults {
    pub theme: String,
    pub country_code: String,
    pub message_template: String,
}
