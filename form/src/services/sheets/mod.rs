//! Spreadsheet uploads for the form.
//!
//! - `POST /api/sheets/upload`: multipart/form-data with a `file` field holding an
//!   `.xlsx`, `.xls`, `.ods` or `.csv` file. The file is streamed to the upload
//!   directory under a name derived from its MD5 hash, then parsed once to return
//!   its headers and row count. The returned `sheet_id` is what
//!   `POST /api/send/start` later refers to.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod upload;

const API_PATH: &str = "/api/sheets";

/// Configures and returns the Actix scope for spreadsheet routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
