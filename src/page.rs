//! Render targets of the emergency page
//!
//! `Page` owns the visible state of every element the coordinator writes to:
//! the status line, the connectivity badge, the result panel, the fallback
//! notice, the instructions panel and the copy button. Front ends (the CLI,
//! a web view, tests) read it through [`Page::snapshot`].

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default label of the copy button
pub const COPY_BUTTON_LABEL: &str = "Copy SMS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusClass {
    Info,
    Warning,
    Error,
}

impl StatusClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusClass::Info => "status-info",
            StatusClass::Warning => "status-warning",
            StatusClass::Error => "status-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub class: StatusClass,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityBadge {
    pub label: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultPanel {
    pub visible: bool,
    pub title: String,
    pub summary: String,
    pub steps: Vec<String>,
    pub sms_text: String,
    /// Number of times the panel was scrolled into view
    pub scroll_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstructionsPanel {
    pub visible: bool,
    pub html: String,
    pub scroll_count: u32,
}

/// Everything visible on the page at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub status: StatusLine,
    pub connectivity: ConnectivityBadge,
    pub result: ResultPanel,
    pub fallback_notice_visible: bool,
    pub instructions: InstructionsPanel,
    pub copy_button_label: String,
    /// Blocking notices raised to the user, oldest first
    pub notices: Vec<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            status: StatusLine {
                text: String::new(),
                class: StatusClass::Info,
                visible: false,
            },
            connectivity: ConnectivityBadge {
                label: String::new(),
                class: String::new(),
            },
            result: ResultPanel::default(),
            fallback_notice_visible: false,
            instructions: InstructionsPanel::default(),
            copy_button_label: COPY_BUTTON_LABEL.to_string(),
            notices: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct PageInner {
    state: PageState,
    /// Bumped on every status write so stale hide timers can tell they lost
    status_generation: u64,
}

/// Shared handle to the page; clones point at the same elements
#[derive(Debug, Clone, Default)]
pub struct Page {
    inner: Arc<Mutex<PageInner>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> PageState {
        self.inner.lock().await.state.clone()
    }

    pub async fn show_status(&self, text: &str, class: StatusClass) {
        self.write_status(text, class).await;
    }

    /// Show a status message that hides itself after `hide_after`,
    /// unless another status write happens first.
    pub async fn show_status_for(&self, text: &str, class: StatusClass, hide_after: Duration) {
        let generation = self.write_status(text, class).await;
        let page = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(hide_after).await;
            let mut inner = page.inner.lock().await;
            if inner.status_generation == generation {
                inner.state.status.visible = false;
            }
        });
    }

    async fn write_status(&self, text: &str, class: StatusClass) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.status_generation += 1;
        inner.state.status = StatusLine {
            text: text.to_string(),
            class,
            visible: true,
        };
        debug!("Status [{}]: {}", class.css_class(), text);
        inner.status_generation
    }

    pub async fn hide_status(&self) {
        let mut inner = self.inner.lock().await;
        inner.status_generation += 1;
        inner.state.status.visible = false;
    }

    pub async fn set_connectivity(&self, label: &str, class: &str) {
        let mut inner = self.inner.lock().await;
        inner.state.connectivity = ConnectivityBadge {
            label: label.to_string(),
            class: class.to_string(),
        };
    }

    /// Hide the result panel and the fallback notice ahead of a new dispatch
    pub async fn reset_result(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.result.visible = false;
        inner.state.fallback_notice_visible = false;
    }

    pub async fn set_fallback_notice(&self, visible: bool) {
        self.inner.lock().await.state.fallback_notice_visible = visible;
    }

    /// Replace the result panel content, reveal it and scroll it into view
    pub async fn show_result(&self, title: String, summary: String, steps: Vec<String>, sms_text: String) {
        let mut inner = self.inner.lock().await;
        let result = &mut inner.state.result;
        result.title = title;
        result.summary = summary;
        result.steps = steps;
        result.sms_text = sms_text;
        result.visible = true;
        result.scroll_count += 1;
    }

    pub async fn show_instructions(&self, html: String) {
        let mut inner = self.inner.lock().await;
        let panel = &mut inner.state.instructions;
        panel.html = html;
        panel.visible = true;
        panel.scroll_count += 1;
    }

    pub async fn sms_text(&self) -> String {
        self.inner.lock().await.state.result.sms_text.clone()
    }

    pub async fn copy_button_label(&self) -> String {
        self.inner.lock().await.state.copy_button_label.clone()
    }

    pub async fn set_copy_button_label(&self, label: &str) {
        self.inner.lock().await.state.copy_button_label = label.to_string();
    }

    /// Raise a blocking notice (the page equivalent of an alert dialog)
    pub async fn notify(&self, message: &str) {
        warn!("User notice: {}", message);
        self.inner.lock().await.state.notices.push(message.to_string());
    }
}
