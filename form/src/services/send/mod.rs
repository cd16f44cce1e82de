//! - `POST /api/send/start`: JSON body `{ sheet_id, phone_column, country_code,
//!   selected_vars, message_template }`. Writes the sender configuration, starts
//!   the sender and shuts the form server down.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod start;

const API_PATH: &str = "/api/send";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/start", post().to(start::process))
}
