//! Email delivery for rendered messages.
//!
//! - Recipient: notifier `mail` option, else the owning account's address
//! - Language: account preference (or site default), or the message's own
//!   language when `language_override` is on
//! - Body view mode is stripped to plain text, then handed to the mail facility

use crate::domain::{
    Account, DeliveryResult, DomainError, Language, MAIL_CHANNEL, MailRequest, Message,
    OutputBundle, VIEW_MODE_EMAIL_BODY, VIEW_MODE_EMAIL_SUBJECT, ViewMode, strip_tags,
};
use crate::ports::{AccountStore, LanguageProvider, MailDispatcher, Notifier};
use crate::shared::config::NotifierOptions;
use std::sync::Arc;
use tracing::{debug, info};

const EMAIL_VIEW_MODES: [ViewMode; 2] = [
    ViewMode {
        id: VIEW_MODE_EMAIL_SUBJECT,
        label: "Notify - Email subject",
    },
    ViewMode {
        id: VIEW_MODE_EMAIL_BODY,
        label: "Notify - Email body",
    },
];

/// Email notifier. Holds only its collaborators; no per-delivery state.
pub struct EmailNotifier {
    accounts: Arc<dyn AccountStore>,
    languages: Arc<dyn LanguageProvider>,
    mailer: Arc<dyn MailDispatcher>,
}

impl EmailNotifier {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        languages: Arc<dyn LanguageProvider>,
        mailer: Arc<dyn MailDispatcher>,
    ) -> Self {
        Self {
            accounts,
            languages,
            mailer,
        }
    }

    /// The two view modes an email needs: subject and body.
    pub fn email_view_modes() -> Vec<ViewMode> {
        EMAIL_VIEW_MODES.to_vec()
    }

    /// Pick the recipient address. `account` is only consulted without an override.
    fn resolve_recipient(
        uid: i64,
        options: &NotifierOptions,
        account: Option<&Account>,
    ) -> Result<String, DomainError> {
        if let Some(mail) = options.mail_override() {
            return Ok(mail.to_string());
        }
        account
            .map(|a| a.mail.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .ok_or(DomainError::MissingRecipient { uid })
    }

    async fn resolve_language(
        &self,
        message: &Message,
        options: &NotifierOptions,
        account: Option<&Account>,
    ) -> Result<Language, DomainError> {
        let code = if options.language_override {
            Some(message.language.as_str())
        } else {
            account.and_then(Account::preferred_language)
        };

        let Some(code) = code else {
            return self.languages.default_language().await;
        };

        let mut installed = self.languages.languages().await?;
        installed
            .remove(code)
            .ok_or_else(|| DomainError::UnknownLanguage {
                code: code.to_string(),
            })
    }

    /// Strip markup from the body; both email view modes must be present.
    fn sanitize(mut output: OutputBundle) -> Result<OutputBundle, DomainError> {
        if !output.contains(VIEW_MODE_EMAIL_SUBJECT) {
            return Err(DomainError::MissingViewMode(VIEW_MODE_EMAIL_SUBJECT.into()));
        }
        let body = output
            .get_mut(VIEW_MODE_EMAIL_BODY)
            .ok_or_else(|| DomainError::MissingViewMode(VIEW_MODE_EMAIL_BODY.into()))?;
        *body = strip_tags(body);
        Ok(output)
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    fn view_modes(&self) -> Vec<ViewMode> {
        Self::email_view_modes()
    }

    async fn deliver(
        &self,
        message: &Message,
        options: &NotifierOptions,
        output: OutputBundle,
    ) -> Result<DeliveryResult, DomainError> {
        let output = Self::sanitize(output)?;

        // The account is needed for the address fallback and the non-override language.
        let needs_account = options.mail_override().is_none() || !options.language_override;
        let account = if needs_account {
            let account = self.accounts.load_account(message.uid).await?;
            debug!(uid = message.uid, "loaded account");
            Some(account)
        } else {
            None
        };

        let recipient = Self::resolve_recipient(message.uid, options, account.as_ref())?;
        let language = self
            .resolve_language(message, options, account.as_ref())
            .await?;
        debug!(
            uid = message.uid,
            recipient = %recipient,
            language = %language.code,
            override_language = options.language_override,
            "resolved delivery target"
        );

        let request = MailRequest {
            channel: MAIL_CHANNEL.to_string(),
            category: message.message_type.clone(),
            recipient,
            language,
            output,
        };
        let mail_id = request.mail_id();
        let result = self.mailer.dispatch(request).await?;

        info!(
            uid = message.uid,
            mail_id = %mail_id,
            recipient = %result.recipient,
            sent = result.sent,
            "message handed to mail facility"
        );
        Ok(result)
    }
}
