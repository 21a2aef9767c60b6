//! Application use cases. Orchestrate domain logic via ports.

pub mod email_notifier;

pub use email_notifier::EmailNotifier;
