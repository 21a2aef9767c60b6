//! Application configuration. Notifier options, collaborators, mail transport.

use serde::Deserialize;

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTPS port: TLS from the first byte.
pub const SMTPS_PORT: u16 = 465;

/// Default site language code.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-notifier options. Unknown keys are rejected so typos surface at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierOptions {
    /// Address override. `None` and blank strings both mean "use the account's address".
    pub mail: Option<String>,

    /// When true, mail goes out in the message's own language instead of the account's.
    #[serde(alias = "language override")]
    pub language_override: bool,
}

impl NotifierOptions {
    /// The override address, if it is actually usable.
    pub fn mail_override(&self) -> Option<&str> {
        self.mail
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Which [`MailDispatcher`](crate::ports::MailDispatcher) the binary wires up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Log only; nothing leaves the process.
    #[default]
    Log,
    Smtp,
    /// JSON POST to a mail relay.
    Http,
}

/// How the SMTP connection is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTlsMode {
    /// Plaintext. Local relays only.
    None,
    /// Plaintext greeting, then upgrade via STARTTLS (port 587).
    Starttls,
    /// Implicit TLS on connect (port 465).
    Tls,
}

impl SmtpTlsMode {
    /// Mode a server on `port` expects: implicit TLS on 465, STARTTLS elsewhere.
    pub fn for_port(port: u16) -> Self {
        if port == SMTPS_PORT {
            Self::Tls
        } else {
            Self::Starttls
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// SQLite account database. Read from MESSAGE_NOTIFY_DATABASE_PATH.
    #[serde(default)]
    pub database_path: Option<String>,

    /// JSON array of accounts. Seeds the database when one is configured, else served from memory.
    #[serde(default)]
    pub accounts_path: Option<String>,

    /// JSON array of installed languages. Defaults to English only.
    #[serde(default)]
    pub languages_path: Option<String>,

    #[serde(default)]
    pub default_language: Option<String>,

    #[serde(default)]
    pub transport: Option<TransportKind>,

    // ─────────────────────────────────────────────────────────────────────────
    // SMTP
    // ─────────────────────────────────────────────────────────────────────────
    /// Sender address for outgoing mail. Read from MESSAGE_NOTIFY_MAIL_FROM.
    #[serde(default)]
    pub mail_from: Option<String>,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default)]
    pub smtp_port: Option<u16>,

    /// none | starttls | tls. Derived from the port when unset.
    #[serde(default)]
    pub smtp_tls: Option<SmtpTlsMode>,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP relay
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub relay_url: Option<String>,

    /// Bearer token for the relay (optional).
    #[serde(default)]
    pub relay_token: Option<String>,

    /// Default notifier options. MESSAGE_NOTIFY_NOTIFIER__MAIL, MESSAGE_NOTIFY_NOTIFIER__LANGUAGE_OVERRIDE.
    #[serde(default)]
    pub notifier: NotifierOptions,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(
            config::Environment::with_prefix("MESSAGE_NOTIFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        if let Ok(path) = std::env::var("MESSAGE_NOTIFY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the default language code. Defaults to "en".
    pub fn default_language_or_default(&self) -> String {
        self.default_language
            .clone()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn transport_or_default(&self) -> TransportKind {
        self.transport.unwrap_or_default()
    }

    /// Returns SMTP port. Defaults to 587.
    pub fn smtp_port_or_default(&self) -> u16 {
        self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
    }

    /// Returns the configured TLS mode, or the one matching the SMTP port.
    pub fn smtp_tls_or_default(&self) -> SmtpTlsMode {
        self.smtp_tls
            .unwrap_or_else(|| SmtpTlsMode::for_port(self.smtp_port_or_default()))
    }

    /// Returns true if SMTP host and sender address are set.
    pub fn is_smtp_configured(&self) -> bool {
        self.smtp_host.is_some() && self.mail_from.is_some()
    }

    pub fn is_relay_configured(&self) -> bool {
        self.relay_url.is_some()
    }
}
