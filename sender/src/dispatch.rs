//! Delivering one message to one phone number through WhatsApp Web.

use crate::browser;
use crate::phone::last_four_digits;
use crate::session::SessionProbe;
use crate::timings::Timings;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use log::{debug, info, warn};
use std::path::PathBuf;
use tokio::time::{sleep, Instant};

const APP_URL: &str = "https://web.whatsapp.com/";

const CHAT_LIST_SELECTOR: &str =
    "div[role='list'], div[data-testid='chat-list'], div[class*='chat']";

const QR_CODE_SELECTOR: &str = "canvas";

const EDITABLE_SELECTOR: &str = "div[contenteditable='true']";

/// Where the compose box has been found over time, most reliable first.
const COMPOSE_BOX_LOCATORS: [Locator; 4] = [
    Locator::Css(
        "div[contenteditable='true'][data-tab='10'], \
         div[contenteditable='true'][data-tab='9'], \
         footer div[contenteditable='true']",
    ),
    Locator::XPath("//footer//div[@contenteditable='true']"),
    Locator::XPath(
        "/html/body/div[1]/div/div/div[3]/div/div[4]/div/footer/div[1]/div/span/div/div[2]/div[1]/div[2]/div[1]/p",
    ),
    Locator::SecondEditable,
];

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("could not open chat: {0}")]
    Navigation(String),

    #[error("could not find message input box")]
    ComposeBoxNotFound,

    #[error("could not type message: {0}")]
    Input(String),

    #[error("could not submit message: {0}")]
    Submit(String),
}

/// Sends rendered messages. The batch only talks to this trait, which keeps
/// retry and counting independent of the browser.
#[async_trait(?Send)]
pub trait Messenger {
    async fn send(&mut self, phone: &str, message: &str) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, Copy)]
enum Locator {
    Css(&'static str),
    XPath(&'static str),
    /// Second of all contenteditable divs; the first one is the chat search box.
    SecondEditable,
}

impl Locator {
    fn describe(&self) -> &'static str {
        match self {
            Locator::Css(_) => "data-tab selector",
            Locator::XPath(x) if x.starts_with("//") => "footer selector",
            Locator::XPath(_) => "absolute path",
            Locator::SecondEditable => "second editable",
        }
    }

    async fn find(&self, page: &Page) -> Result<Option<Element>, CdpError> {
        match self {
            Locator::Css(css) => page.find_elements(*css).await.map(|v| v.into_iter().next()),
            Locator::XPath(xpath) => page.find_xpaths(*xpath).await.map(|v| v.into_iter().next()),
            Locator::SecondEditable => page
                .find_elements(EDITABLE_SELECTOR)
                .await
                .map(|v| v.into_iter().nth(1)),
        }
    }
}

/// One input action while filling the compose box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComposeStep<'a> {
    Type(&'a str),
    /// Shift+Enter: a line break that does not send.
    SoftNewline,
    Submit,
}

/// Input actions for `message`: each line typed with its trailing `\r`
/// removed, a soft newline between lines, one submit at the end. Empty lines
/// produce no typing, only their line break.
fn compose_steps(message: &str) -> Vec<ComposeStep<'_>> {
    let mut steps = Vec::new();
    for (i, line) in message.split('\n').enumerate() {
        if i > 0 {
            steps.push(ComposeStep::SoftNewline);
        }
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            steps.push(ComposeStep::Type(line));
        }
    }
    steps.push(ComposeStep::Submit);
    steps
}

/// `Messenger` and `SessionProbe` backed by a live WhatsApp Web page.
pub struct WhatsAppWeb {
    page: Page,
    output_dir: PathBuf,
    timings: Timings,
}

impl WhatsAppWeb {
    pub fn new(page: Page, output_dir: PathBuf, timings: Timings) -> Self {
        Self {
            page,
            output_dir,
            timings,
        }
    }

    /// Polls one locator until it yields an element or `element_wait` passes.
    /// The last strategy is a single look, there is nothing to wait for.
    async fn wait_for(&self, locator: Locator) -> Option<Element> {
        let deadline = Instant::now() + self.timings.element_wait;
        loop {
            match locator.find(&self.page).await {
                Ok(Some(element)) => return Some(element),
                Ok(None) => {}
                Err(e) => debug!("{} lookup failed: {}", locator.describe(), e),
            }
            if matches!(locator, Locator::SecondEditable) || Instant::now() >= deadline {
                return None;
            }
            sleep(self.timings.element_poll).await;
        }
    }

    async fn find_compose_box(&self) -> Result<Element, DispatchError> {
        for locator in COMPOSE_BOX_LOCATORS {
            if let Some(element) = self.wait_for(locator).await {
                info!("found message box ({})", locator.describe());
                return Ok(element);
            }
        }
        Err(DispatchError::ComposeBoxNotFound)
    }

    async fn try_send(&self, phone: &str, message: &str) -> Result<(), DispatchError> {
        let url = format!("{}send?phone={}", APP_URL, phone);
        self.page
            .goto(url)
            .await
            .map_err(|e| DispatchError::Navigation(e.to_string()))?;
        sleep(self.timings.page_settle).await;

        let compose = self.find_compose_box().await?;

        compose
            .click()
            .await
            .map_err(|e| DispatchError::Input(e.to_string()))?;
        sleep(self.timings.focus_settle).await;

        browser::clear_editable(&compose)
            .await
            .map_err(|e| DispatchError::Input(e.to_string()))?;
        sleep(self.timings.clear_settle).await;

        for step in compose_steps(message) {
            match step {
                ComposeStep::Type(text) => browser::type_text(&self.page, text)
                    .await
                    .map_err(|e| DispatchError::Input(e.to_string()))?,
                ComposeStep::SoftNewline => {
                    browser::press_shift_enter(&self.page)
                        .await
                        .map_err(|e| DispatchError::Input(e.to_string()))?;
                    sleep(self.timings.line_break_pause).await;
                }
                ComposeStep::Submit => {
                    compose
                        .press_key("Enter")
                        .await
                        .map_err(|e| DispatchError::Submit(e.to_string()))?;
                }
            }
        }
        sleep(self.timings.after_send).await;
        Ok(())
    }

    /// Best effort: a failed screenshot is logged and otherwise ignored.
    async fn capture_failure(&self, phone: &str) {
        let path = self
            .output_dir
            .join(format!("error_send_{}.png", last_four_digits(phone)));
        match browser::save_screenshot(&self.page, &path).await {
            Ok(()) => info!("  screenshot saved: {}", path.display()),
            Err(e) => debug!("screenshot {} not saved: {}", path.display(), e),
        }
    }
}

#[async_trait(?Send)]
impl Messenger for WhatsAppWeb {
    async fn send(&mut self, phone: &str, message: &str) -> Result<(), DispatchError> {
        info!("sending to: {}", phone);
        match self.try_send(phone, message).await {
            Ok(()) => {
                info!("message sent to {}", phone);
                Ok(())
            }
            Err(e) => {
                warn!("failed to send: {}", e);
                self.capture_failure(phone).await;
                Err(e)
            }
        }
    }
}

#[async_trait(?Send)]
impl SessionProbe for WhatsAppWeb {
    async fn open_app(&mut self) -> Result<(), String> {
        self.page.goto(APP_URL).await.map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn chat_list_visible(&mut self) -> Result<bool, String> {
        self.page
            .find_elements(CHAT_LIST_SELECTOR)
            .await
            .map(|v| !v.is_empty())
            .map_err(|e| e.to_string())
    }

    async fn qr_code_visible(&mut self) -> Result<bool, String> {
        self.page
            .find_elements(QR_CODE_SELECTOR)
            .await
            .map(|v| !v.is_empty())
            .map_err(|e| e.to_string())
    }
}
