//! SMTP mail dispatcher via lettre.
//!
//! Builds a plain-text message from the subject/body view modes and submits it
//! on a blocking task. Retries and queuing are the relay's job, not ours.

use crate::domain::{DeliveryResult, DomainError, MailRequest};
use crate::ports::MailDispatcher;
use crate::shared::config::SmtpTlsMode;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

/// `Content-Language` header carrying the resolved language code.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContentLanguage(String);

impl Header for ContentLanguage {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Language")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

pub struct SmtpMailDispatcher {
    transport: SmtpTransport,
    tls_mode: SmtpTlsMode,
    from: Mailbox,
}

impl SmtpMailDispatcher {
    /// Connect to `host:port` with the given encryption. Credentials are optional for open relays.
    pub fn new(
        host: &str,
        port: u16,
        tls_mode: SmtpTlsMode,
        credentials: Option<(String, String)>,
        from: &str,
    ) -> Result<Self, DomainError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| DomainError::Config(format!("invalid from address '{from}': {e}")))?;

        let mut builder = SmtpTransport::builder_dangerous(host).port(port);
        builder = match tls_mode {
            SmtpTlsMode::None => builder.tls(Tls::None),
            SmtpTlsMode::Starttls => builder.tls(Tls::Required(Self::tls_parameters(host)?)),
            SmtpTlsMode::Tls => builder.tls(Tls::Wrapper(Self::tls_parameters(host)?)),
        };
        if let Some((user, pass)) = credentials {
            builder = builder.credentials(Credentials::new(user, pass));
        }
        Ok(Self {
            transport: builder.build(),
            tls_mode,
            from,
        })
    }

    fn tls_parameters(host: &str) -> Result<TlsParameters, DomainError> {
        TlsParameters::new(host.to_string())
            .map_err(|e| DomainError::Config(format!("TLS configuration error: {e}")))
    }

    pub fn tls_mode(&self) -> SmtpTlsMode {
        self.tls_mode
    }

    fn build_message(&self, request: &MailRequest) -> Result<Message, DomainError> {
        let to = request
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| DomainError::Mail(format!("invalid recipient '{}': {e}", request.recipient)))?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(request.subject())
            .header(ContentType::TEXT_PLAIN)
            .header(ContentLanguage(request.language.code.clone()))
            .body(request.body().to_string())
            .map_err(|e| DomainError::Mail(format!("failed to build email: {e}")))
    }
}

#[async_trait::async_trait]
impl MailDispatcher for SmtpMailDispatcher {
    async fn dispatch(&self, request: MailRequest) -> Result<DeliveryResult, DomainError> {
        let email = self.build_message(&request)?;
        let transport = self.transport.clone();

        let response = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| DomainError::Mail(format!("SMTP task failed: {e}")))?
            .map_err(|e| DomainError::Mail(format!("SMTP send failed: {e}")))?;

        let transport_id = response.first_line().map(str::to_string);
        info!(
            mail_id = %request.mail_id(),
            to = %request.recipient,
            language = %request.language.code,
            "mail submitted via SMTP"
        );
        Ok(DeliveryResult::accepted(&request, transport_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Language, OutputBundle, VIEW_MODE_EMAIL_BODY, VIEW_MODE_EMAIL_SUBJECT};

    fn request(recipient: &str) -> MailRequest {
        MailRequest {
            channel: "message_notify".into(),
            category: "welcome".into(),
            recipient: recipient.into(),
            language: Language::new("fr", "French"),
            output: OutputBundle::new()
                .with(VIEW_MODE_EMAIL_SUBJECT, "Bienvenue")
                .with(VIEW_MODE_EMAIL_BODY, "Bonjour et bienvenue"),
        }
    }

    fn dispatcher() -> SmtpMailDispatcher {
        SmtpMailDispatcher::new(
            "smtp.example.com",
            587,
            SmtpTlsMode::for_port(587),
            None,
            "Site <noreply@example.com>",
        )
        .unwrap()
    }

    #[test]
    fn test_build_message_headers() {
        let email = dispatcher().build_message(&request("a@x.com")).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("To: a@x.com"));
        assert!(raw.contains("Subject: Bienvenue"));
        assert!(raw.contains("Content-Language: fr"));
        assert!(raw.contains("Bonjour et bienvenue"));
    }

    #[test]
    fn test_invalid_recipient_is_mail_error() {
        let err = dispatcher().build_message(&request("not an address")).unwrap_err();
        assert!(matches!(err, DomainError::Mail(_)));
    }

    #[test]
    fn test_invalid_from_is_config_error() {
        let err = SmtpMailDispatcher::new("smtp.example.com", 587, SmtpTlsMode::Starttls, None, "nope")
            .err()
            .unwrap();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_tls_mode_follows_port() {
        let submission = dispatcher();
        assert_eq!(submission.tls_mode(), SmtpTlsMode::Starttls);

        let smtps = SmtpMailDispatcher::new(
            "smtp.example.com",
            465,
            SmtpTlsMode::for_port(465),
            None,
            "noreply@example.com",
        )
        .unwrap();
        assert_eq!(smtps.tls_mode(), SmtpTlsMode::Tls);
    }

    #[tokio::test]
    async fn test_starttls_opens_with_plaintext_ehlo() {
        use std::io::{Read, Write};
        use std::time::Duration;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
            stream.write_all(b"220 localhost ESMTP\r\n").unwrap();
            let mut buf = [0u8; 256];
            let n = stream.read(&mut buf).unwrap_or(0);
            buf[..n].to_vec()
        });

        let dispatcher = SmtpMailDispatcher::new(
            "127.0.0.1",
            port,
            SmtpTlsMode::Starttls,
            None,
            "noreply@example.com",
        )
        .unwrap();
        // The fake server hangs up after the greeting exchange, so the send itself fails.
        let result = dispatcher.dispatch(request("a@x.com")).await;
        assert!(matches!(result, Err(DomainError::Mail(_))));

        let first_bytes = server.join().unwrap();
        assert!(
            first_bytes.starts_with(b"EHLO"),
            "client opened with {:?}",
            String::from_utf8_lossy(&first_bytes)
        );
    }
}
