//! Shared state of the form server and the shutdown that follows a launch.
//!
//! The form is single-use: once the sender process has been started the
//! server has nothing left to do. A handler asks for shutdown by sending on
//! `FormState::shutdown`; the listener spawned in `main.rs` waits a moment so
//! the HTTP response can reach the browser, then stops the server.

use crate::config::FormSettings;
use actix_web::dev::ServerHandle;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long the server keeps running after a launch was requested.
const SHUTDOWN_DELAY: Duration = Duration::from_millis(500);

/// Handler-visible state, injected as `web::Data<FormState>`.
#[derive(Clone)]
pub struct FormState {
    pub settings: Arc<FormSettings>,
    /// Sending on this channel shuts the server down.
    pub shutdown: mpsc::Sender<()>,
}

impl FormState {
    pub fn new(settings: FormSettings, shutdown: mpsc::Sender<()>) -> Self {
        Self {
            settings: Arc::new(settings),
            shutdown,
        }
    }

    /// Asks the server to stop. Repeated requests are ignored.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown.try_send(());
    }
}

/// Waits for the first shutdown request, then stops the server gracefully.
pub async fn start_shutdown_listener(handle: ServerHandle, mut rx: mpsc::Receiver<()>) {
    if rx.recv().await.is_some() {
        tokio::time::sleep(SHUTDOWN_DELAY).await;
        info!("sender launched, closing the form");
        handle.stop(true).await;
    }
}
