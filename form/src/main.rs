mod config;
mod launcher;
mod services;

use crate::config::FormSettings;
use crate::launcher::state::{start_shutdown_listener, FormState};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let settings = FormSettings::from_env();
    let url = settings.url();
    let bind = (settings.host.clone(), settings.port);

    if !settings.sender_path.is_file() {
        warn!(
            "sender executable not found at {}, launching will fail",
            settings.sender_path.display()
        );
    }

    let (tx, rx) = mpsc::channel(1);
    let state = FormState::new(settings, tx);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .app_data(web::Data::new(state.clone()))
            .route("/api/settings", web::get().to(services::settings::process))
            .service(services::sheets::configure_routes())
            .service(services::send::configure_routes())
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind)?
    .run();

    tokio::spawn(start_shutdown_listener(server.handle(), rx));

    {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url);
        });
    }

    info!("Form running at {}", url);
    server.await
}
