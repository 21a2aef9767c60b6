//! Outbound ports. The notifier calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Account, DeliveryResult, DomainError, Language, MailRequest};
use std::collections::BTreeMap;

/// Account lookup by user id.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Load the account owning `uid`. Unknown ids are an error, not a default.
    async fn load_account(&self, uid: i64) -> Result<Account, DomainError>;
}

/// Installed languages.
#[async_trait::async_trait]
pub trait LanguageProvider: Send + Sync {
    /// All installed languages keyed by code.
    async fn languages(&self) -> Result<BTreeMap<String, Language>, DomainError>;

    /// The site-wide default language.
    async fn default_language(&self) -> Result<Language, DomainError>;
}

/// Mail facility. Owns transport, queuing and retries.
#[async_trait::async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Hand one mail to the transport. The result is passed back to the caller as-is.
    async fn dispatch(&self, request: MailRequest) -> Result<DeliveryResult, DomainError>;
}
