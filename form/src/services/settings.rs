use crate::launcher::state::FormState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::FormDefaults;

/// Builds the defaults the page applies before the user touches anything.
pub fn defaults(state: &FormState) -> FormDefaults {
    let settings = &state.settings;
    FormDefaults {
        theme: settings.theme.as_str().to_string(),
        country_code: settings.default_country_code.clone(),
        message_template: settings.default_template.clone(),
    }
}

/// `GET /api/settings`
pub async fn process(state: web::Data<FormState>) -> impl Responder {
    HttpResponse::Ok().json(defaults(&state))
}
