//! No-op notifier adapter
//!
//! Used when `notify` is off.

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

/// Notifier that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl NoOpNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(
        &self,
        _title: &str,
        _message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_returns_ok() {
        let notifier = NoOpNotifier::new();
        assert!(notifier
            .notify("HotScribe", "ignored", NotificationIcon::Error)
            .await
            .is_ok());
    }
}
