//! Log-only mail dispatcher for development and dry runs.
//!
//! Records the mail in the log and reports it as sent. Nothing leaves the process.

use crate::domain::{DeliveryResult, DomainError, MailRequest};
use crate::ports::MailDispatcher;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Default)]
pub struct LogMailDispatcher {
    sent: AtomicU64,
}

impl LogMailDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mails logged so far.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl MailDispatcher for LogMailDispatcher {
    async fn dispatch(&self, request: MailRequest) -> Result<DeliveryResult, DomainError> {
        let seq = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            mail_id = %request.mail_id(),
            to = %request.recipient,
            language = %request.language.code,
            subject = %request.subject(),
            body_len = request.body().len(),
            "[LOG] mail not sent (log transport)"
        );
        Ok(DeliveryResult::accepted(&request, Some(format!("log-{seq}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, OutputBundle, VIEW_MODE_EMAIL_BODY, VIEW_MODE_EMAIL_SUBJECT};

    #[tokio::test]
    async fn test_log_dispatcher_reports_sent() {
        let dispatcher = LogMailDispatcher::new();
        let request = MailRequest {
            channel: "message_notify".into(),
            category: "welcome".into(),
            recipient: "a@x.com".into(),
            language: Language::new("en", "English"),
            output: OutputBundle::new()
                .with(VIEW_MODE_EMAIL_SUBJECT, "Hi")
                .with(VIEW_MODE_EMAIL_BODY, "Body"),
        };

        let first = dispatcher.dispatch(request.clone()).await.unwrap();
        let second = dispatcher.dispatch(request).await.unwrap();

        assert!(first.sent);
        assert_eq!(first.mail_id, "message_notify_welcome");
        assert_eq!(first.transport_id.as_deref(), Some("log-1"));
        assert_eq!(second.transport_id.as_deref(), Some("log-2"));
        assert_eq!(dispatcher.sent_count(), 2);
    }
}
