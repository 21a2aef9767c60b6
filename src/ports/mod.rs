//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the upstream dispatcher into the notifier
//! - Outbound: Called by the notifier into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::Notifier;
pub use outbound::{AccountStore, LanguageProvider, MailDispatcher};
