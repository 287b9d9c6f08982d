//! Connectivity state and its on-page indicator
//!
//! A single [`Connectivity`] source owns the online/offline flag. Readers
//! hold a [`ConnectivityWatch`]; the indicator task projects every
//! transition onto the page badge.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::page::Page;

/// Display mode of the connectivity badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityMode {
    Online,
    Offline,
}

impl ConnectivityMode {
    pub fn from_online(online: bool) -> Self {
        if online {
            ConnectivityMode::Online
        } else {
            ConnectivityMode::Offline
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityMode::Online => "ONLINE",
            ConnectivityMode::Offline => "OFFLINE",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConnectivityMode::Online => "status online",
            ConnectivityMode::Offline => "status offline",
        }
    }
}

/// Writer side of the connectivity flag. Platform glue calls
/// [`Connectivity::set_online`] on each online/offline event.
#[derive(Debug)]
pub struct Connectivity {
    sender: watch::Sender<bool>,
}

impl Connectivity {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self { sender }
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!("Connectivity changed: {}", ConnectivityMode::from_online(online).label());
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn watch(&self) -> ConnectivityWatch {
        ConnectivityWatch {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Read-only view of the connectivity flag
#[derive(Debug, Clone)]
pub struct ConnectivityWatch {
    receiver: watch::Receiver<bool>,
}

impl ConnectivityWatch {
    pub fn is_online(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Apply one connectivity state to the page badge
pub async fn render_indicator(page: &Page, online: bool) {
    let mode = ConnectivityMode::from_online(online);
    page.set_connectivity(mode.label(), mode.css_class()).await;
}

/// Attach the indicator: render the current state, then follow every
/// transition until the [`Connectivity`] source is dropped.
pub fn attach_indicator(watch: ConnectivityWatch, page: Page) -> JoinHandle<()> {
    let mut receiver = watch.receiver;
    tokio::spawn(async move {
        let initial = *receiver.borrow_and_update();
        render_indicator(&page, initial).await;
        while receiver.changed().await.is_ok() {
            let online = *receiver.borrow_and_update();
            render_indicator(&page, online).await;
        }
        debug!("Connectivity source dropped, indicator detached");
    })
}
