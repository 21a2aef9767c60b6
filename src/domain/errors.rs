//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Neither the mail option nor the account yields an address.
    #[error("no recipient address for account {uid}")]
    MissingRecipient { uid: i64 },

    #[error("unknown language: {code}")]
    UnknownLanguage { code: String },

    #[error("output bundle has no '{0}' view mode")]
    MissingViewMode(String),

    #[error("Account store error: {0}")]
    AccountStore(String),

    #[error("Language provider error: {0}")]
    LanguageProvider(String),

    #[error("Mail dispatch error: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
