//! Domain entities. Pure data structures for the notifier.
//!
//! No transport or storage types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code meaning "no language set" on messages and accounts.
pub const LANGUAGE_NONE: &str = "und";

/// Channel name every email notification is dispatched under.
pub const MAIL_CHANNEL: &str = "message_notify";

/// View mode rendered into the email subject.
pub const VIEW_MODE_EMAIL_SUBJECT: &str = "message_notify_email_subject";

/// View mode rendered into the email body.
pub const VIEW_MODE_EMAIL_BODY: &str = "message_notify_email_body";

/// A message produced by the upstream messaging subsystem. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    /// Category tag; becomes the mail category.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Owning account.
    pub uid: i64,
    /// Locale code or [`LANGUAGE_NONE`].
    #[serde(default = "language_none")]
    pub language: String,
}

fn language_none() -> String {
    LANGUAGE_NONE.to_string()
}

/// A user account as resolved from a message's `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uid: i64,
    #[serde(default)]
    pub name: String,
    /// Default delivery address. May be empty.
    #[serde(default)]
    pub mail: String,
    /// Preferred language code. Empty or [`LANGUAGE_NONE`] means unset.
    #[serde(default)]
    pub language: String,
}

impl Account {
    /// The account's language code, if one is actually set.
    pub fn preferred_language(&self) -> Option<&str> {
        let code = self.language.trim();
        (!code.is_empty() && code != LANGUAGE_NONE).then_some(code)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// An installed language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    /// English name, e.g. "French".
    pub name: String,
    /// Name in the language itself, e.g. "Français".
    #[serde(default)]
    pub native: String,
    #[serde(default)]
    pub direction: TextDirection,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: code.into(),
            native: name.clone(),
            name,
            direction: TextDirection::Ltr,
        }
    }
}

/// A named rendering selector and its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewMode {
    pub id: &'static str,
    pub label: &'static str,
}

/// Rendered output of a message, keyed by view mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputBundle(BTreeMap<String, String>);

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, view_mode: impl Into<String>, rendered: impl Into<String>) -> Self {
        self.insert(view_mode, rendered);
        self
    }

    pub fn insert(&mut self, view_mode: impl Into<String>, rendered: impl Into<String>) {
        self.0.insert(view_mode.into(), rendered.into());
    }

    pub fn get(&self, view_mode: &str) -> Option<&str> {
        self.0.get(view_mode).map(String::as_str)
    }

    pub fn get_mut(&mut self, view_mode: &str) -> Option<&mut String> {
        self.0.get_mut(view_mode)
    }

    pub fn contains(&self, view_mode: &str) -> bool {
        self.0.contains_key(view_mode)
    }
}

/// What the notifier hands to the mail facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRequest {
    pub channel: String,
    pub category: String,
    pub recipient: String,
    pub language: Language,
    pub output: OutputBundle,
}

impl MailRequest {
    /// Identifier of the mail kind, e.g. `message_notify_comment_reply`.
    pub fn mail_id(&self) -> String {
        format!("{}_{}", self.channel, self.category)
    }

    pub fn subject(&self) -> &str {
        self.output.get(VIEW_MODE_EMAIL_SUBJECT).unwrap_or_default()
    }

    pub fn body(&self) -> &str {
        self.output.get(VIEW_MODE_EMAIL_BODY).unwrap_or_default()
    }
}

/// Outcome reported by the mail facility. Returned to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub mail_id: String,
    pub recipient: String,
    pub language: String,
    /// Whether the transport accepted the mail.
    pub sent: bool,
    /// Transport-assigned id, when the transport reports one.
    #[serde(default)]
    pub transport_id: Option<String>,
    pub dispatched_at: DateTime<Utc>,
}

impl DeliveryResult {
    pub fn accepted(request: &MailRequest, transport_id: Option<String>) -> Self {
        Self {
            mail_id: request.mail_id(),
            recipient: request.recipient.clone(),
            language: request.language.code.clone(),
            sent: true,
            transport_id,
            dispatched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_language_skips_unset() {
        let mut account = Account {
            uid: 1,
            name: "a".into(),
            mail: "a@x.com".into(),
            language: String::new(),
        };
        assert_eq!(account.preferred_language(), None);
        account.language = LANGUAGE_NONE.into();
        assert_eq!(account.preferred_language(), None);
        account.language = "fr".into();
        assert_eq!(account.preferred_language(), Some("fr"));
    }

    #[test]
    fn test_message_deserializes_type_and_default_language() {
        let msg: Message = serde_json::from_str(r#"{"type":"comment_reply","uid":7}"#).unwrap();
        assert_eq!(msg.message_type, "comment_reply");
        assert_eq!(msg.language, LANGUAGE_NONE);
        assert_eq!(msg.id, None);
    }

    #[test]
    fn test_mail_request_accessors() {
        let req = MailRequest {
            channel: MAIL_CHANNEL.into(),
            category: "welcome".into(),
            recipient: "a@x.com".into(),
            language: Language::new("en", "English"),
            output: OutputBundle::new()
                .with(VIEW_MODE_EMAIL_SUBJECT, "Hello")
                .with(VIEW_MODE_EMAIL_BODY, "Body"),
        };
        assert_eq!(req.mail_id(), "message_notify_welcome");
        assert_eq!(req.subject(), "Hello");
        assert_eq!(req.body(), "Body");
    }
}
