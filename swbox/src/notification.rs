//! Push notification gateway.
//!
//! Turns raw push payloads into displayed notifications and routes clicks on
//! them. Deliberately thin: the engine decides *what* to show, the injected
//! [`NotificationSink`] owns the platform display and window APIs.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::EngineConfig;

/// The body a push message carries, as far as the engine cares.
///
/// Payloads are JSON with an optional `text` field; anything unparseable is
/// treated as plain text. A payload without usable text still produces a
/// notification, with the configured default body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    /// Message text to display, if the sender provided one.
    pub text: Option<String>,
}

impl PushPayload {
    /// Parses a raw push payload.
    pub fn parse(raw: &[u8]) -> Self {
        if raw.is_empty() {
            return PushPayload::default();
        }
        if let Ok(payload) = serde_json::from_slice::<PushPayload>(raw) {
            return payload;
        }
        match std::str::from_utf8(raw) {
            Ok(text) if !text.trim().is_empty() => PushPayload {
                text: Some(text.trim().to_owned()),
            },
            _ => PushPayload::default(),
        }
    }
}

/// An action button attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Open (or focus) the application window.
    Open,
    /// Dismiss the notification.
    Dismiss,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Action buttons, in display order.
    pub actions: Vec<NotificationAction>,
}

/// Platform seam for displaying notifications and opening windows.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Displays a notification.
    async fn show(&self, notification: Notification);

    /// Opens (or focuses) an application window at the given URL.
    async fn open_window(&self, url: &str);
}

/// Routes push messages and notification clicks.
pub struct NotificationGateway {
    config: Arc<EngineConfig>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationGateway {
    /// Creates a gateway over the platform sink.
    pub fn new(config: Arc<EngineConfig>, sink: Arc<dyn NotificationSink>) -> Self {
        NotificationGateway { config, sink }
    }

    /// Handles an incoming push message: always shows a notification, using
    /// the configured default body when the payload carries no text.
    #[instrument(skip_all)]
    pub async fn on_push(&self, raw: &[u8]) {
        let payload = PushPayload::parse(raw);
        let body = payload
            .text
            .unwrap_or_else(|| self.config.default_notification_body.clone());
        debug!(%body, "showing push notification");
        self.sink
            .show(Notification {
                title: self.config.notification_title.clone(),
                body,
                actions: vec![NotificationAction::Open, NotificationAction::Dismiss],
            })
            .await;
    }

    /// Handles a click on a notification action.
    ///
    /// `Open` opens the configured application URL; `Dismiss` does nothing
    /// beyond the dismissal the platform already performed.
    #[instrument(skip(self))]
    pub async fn on_click(&self, action: NotificationAction) {
        match action {
            NotificationAction::Open => {
                self.sink.open_window(self.app_url()).await;
            }
            NotificationAction::Dismiss => {
                debug!("notification dismissed");
            }
        }
    }

    fn app_url(&self) -> &str {
        self.config.app_url.as_str()
    }
}

impl std::fmt::Debug for NotificationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationGateway")
            .field("app_url", &self.config.app_url)
            .finish_non_exhaustive()
    }
}
