//! Desktop notification adapter using notify-rust

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

/// How long a notification stays on screen
const DISPLAY_MS: u32 = 6000;

/// Notifier backed by the platform notification service
pub struct NotifyRustNotifier {
    app_name: String,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self::with_app_name("HotScribe")
    }

    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        let title = title.to_owned();
        let message = message.to_owned();
        let app_name = self.app_name.clone();

        // Talking to the notification daemon blocks
        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(&app_name)
                .summary(&title)
                .body(&message)
                .icon(icon.icon_name())
                .timeout(notify_rust::Timeout::Milliseconds(DISPLAY_MS))
                .show()
                .map(|_| ())
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::Unavailable(format!("Task join error: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_name() {
        assert_eq!(NotifyRustNotifier::default().app_name, "HotScribe");
    }

    #[test]
    fn custom_app_name() {
        let notifier = NotifyRustNotifier::with_app_name("TestApp");
        assert_eq!(notifier.app_name, "TestApp");
    }

    #[tokio::test]
    #[ignore = "Requires a notification daemon"]
    async fn can_show_notification() {
        let notifier = NotifyRustNotifier::new();
        let result = notifier
            .notify("HotScribe", "Test notification", NotificationIcon::Info)
            .await;
        assert!(result.is_ok());
    }
}
