//! Waiting for the user to log in to WhatsApp Web.
//!
//! Login detection is a heuristic over page markup: a chat list showing up, or
//! the QR canvas that was on screen going away. Markup changes can break it, so
//! a timeout is not treated as a failed login. The run continues and the
//! outcome is reported as `TimedOut`.

use crate::timings::Timings;
use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::{sleep, Instant};

/// How the login wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A chat list element appeared.
    ChatListVisible,
    /// The QR code seen earlier is gone.
    QrDismissed,
    /// Neither signal showed up within the authentication window.
    TimedOut,
    /// The app could not be opened; sending is attempted anyway.
    Unreachable(String),
}

impl LoginOutcome {
    pub fn detected(&self) -> bool {
        matches!(self, Self::ChatListVisible | Self::QrDismissed)
    }
}

/// The page queries the login wait relies on.
#[async_trait(?Send)]
pub trait SessionProbe {
    /// Navigates to the messaging app root.
    async fn open_app(&mut self) -> Result<(), String>;
    async fn chat_list_visible(&mut self) -> Result<bool, String>;
    async fn qr_code_visible(&mut self) -> Result<bool, String>;
}

/// One poll of both login signals.
async fn probe_once<P: SessionProbe + ?Sized>(
    probe: &mut P,
    qr_seen: &mut bool,
) -> Result<Option<LoginOutcome>, String> {
    if probe.chat_list_visible().await? {
        return Ok(Some(LoginOutcome::ChatListVisible));
    }
    if probe.qr_code_visible().await? {
        *qr_seen = true;
    } else if *qr_seen {
        return Ok(Some(LoginOutcome::QrDismissed));
    }
    Ok(None)
}

/// Opens the app and polls for a login until the authentication window ends.
pub async fn wait_for_login<P: SessionProbe + ?Sized>(
    probe: &mut P,
    timings: &Timings,
) -> LoginOutcome {
    info!("loading WhatsApp Web");
    if let Err(e) = probe.open_app().await {
        warn!("could not open WhatsApp Web: {}; continuing anyway", e);
        sleep(timings.login_timeout_settle).await;
        return LoginOutcome::Unreachable(e);
    }
    sleep(timings.page_settle).await;

    let window = timings.auth_window.as_secs();
    info!("scan the QR code in the Chrome window; you have {} seconds", window);

    let start = Instant::now();
    let mut next_progress = timings.auth_progress_every;
    let mut qr_seen = false;
    let mut outcome = LoginOutcome::TimedOut;

    while start.elapsed() < timings.auth_window {
        match probe_once(probe, &mut qr_seen).await {
            Ok(Some(found)) => {
                outcome = found;
                break;
            }
            Ok(None) => {}
            Err(e) => debug!("login probe failed: {}", e),
        }

        let elapsed = start.elapsed();
        if !timings.auth_progress_every.is_zero() && elapsed >= next_progress {
            info!("  {}/{} seconds...", elapsed.as_secs(), window);
            next_progress += timings.auth_progress_every;
        }
        sleep(timings.auth_poll).await;
    }

    match &outcome {
        LoginOutcome::ChatListVisible => info!("WhatsApp loaded, chat list visible"),
        LoginOutcome::QrDismissed => info!("QR code disappeared, assuming it was scanned"),
        _ => {}
    }

    if outcome.detected() {
        sleep(timings.post_login_settle).await;
    } else {
        warn!("{} seconds elapsed without detecting a login", window);
        warn!("continuing anyway; make sure WhatsApp Web is loaded");
        sleep(timings.login_timeout_settle).await;
    }
    outcome
}
