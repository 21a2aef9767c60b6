//! Mail facility adapters. Implement MailDispatcher.
//!
//! Log-only for development, SMTP via lettre, and an HTTP relay via reqwest.

pub mod http_relay;
pub mod log_dispatcher;
pub mod smtp;

pub use http_relay::HttpRelayDispatcher;
pub use log_dispatcher::LogMailDispatcher;
pub use smtp::SmtpMailDispatcher;
