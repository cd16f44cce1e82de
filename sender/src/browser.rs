//! Thin wrapper over a chromiumoxide browser: launch, one page, a few input
//! helpers and an orderly shutdown.

use crate::error::SenderError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;

/// CDP modifier bit for Shift.
const MODIFIER_SHIFT: i64 = 8;

/// Clears a contenteditable the way Ctrl+A, Delete would.
const CLEAR_EDITABLE_JS: &str = "function() {
    this.focus();
    document.execCommand('selectAll', false, null);
    document.execCommand('delete', false, null);
}";

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Chrome/Chromium binary; auto-detected when `None`.
    pub chrome: Option<PathBuf>,
    /// Profile directory. Reusing one keeps the WhatsApp login between runs.
    pub profile_dir: Option<PathBuf>,
}

/// A running browser with the single page every step drives.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, SenderError> {
        let mut builder = BrowserConfig::builder()
            .with_head()
            .no_sandbox()
            .viewport(None)
            .window_size(1366, 900)
            .args(["--disable-dev-shm-usage", "--disable-gpu", "--start-maximized"]);
        if let Some(chrome) = &options.chrome {
            builder = builder.chrome_executable(chrome);
        }
        if let Some(dir) = &options.profile_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder.build().map_err(SenderError::BrowserLaunch)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| SenderError::BrowserLaunch(e.to_string()))?;

        // The connection only makes progress while its event stream is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("browser event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                handler.abort();
                return Err(SenderError::BrowserLaunch(e.to_string()));
            }
        };

        info!("Chrome ready");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes the browser and stops the event task. Errors are logged only;
    /// there is nothing left to do with a browser that will not close.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("closing browser failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        info!("browser closed");
    }
}

/// Presses Shift+Enter on the focused element: a line break inside the
/// compose box instead of a submit.
pub async fn press_shift_enter(page: &Page) -> Result<(), CdpError> {
    for kind in [DispatchKeyEventType::RawKeyDown, DispatchKeyEventType::KeyUp] {
        let params = DispatchKeyEventParams::builder()
            .r#type(kind)
            .modifiers(MODIFIER_SHIFT)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .map_err(CdpError::ChromeMessage)?;
        page.execute(params).await?;
    }
    Ok(())
}

/// One `char` event per character of `text`.
///
/// Char events carry the text itself, so any script or emoji can be typed; key
/// name lookups only cover the US layout.
pub fn char_events(text: &str) -> Result<Vec<DispatchKeyEventParams>, CdpError> {
    text.chars()
        .map(|ch| {
            DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::Char)
                .text(ch.to_string())
                .build()
                .map_err(CdpError::ChromeMessage)
        })
        .collect()
}

/// Types `text` into the focused element.
pub async fn type_text(page: &Page, text: &str) -> Result<(), CdpError> {
    for params in char_events(text)? {
        page.execute(params).await?;
    }
    Ok(())
}

/// Selects and deletes everything inside a contenteditable element.
pub async fn clear_editable(element: &chromiumoxide::element::Element) -> Result<(), CdpError> {
    element.call_js_fn(CLEAR_EDITABLE_JS, false).await?;
    Ok(())
}

/// Writes a PNG of the current viewport to `path`.
pub async fn save_screenshot(page: &Page, path: &Path) -> Result<(), CdpError> {
    page.save_screenshot(ScreenshotParams::builder().build(), path).await?;
    Ok(())
}
