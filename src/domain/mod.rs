//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod markup;

pub use entities::{
    Account, DeliveryResult, LANGUAGE_NONE, Language, MAIL_CHANNEL, MailRequest, Message,
    OutputBundle, TextDirection, VIEW_MODE_EMAIL_BODY, VIEW_MODE_EMAIL_SUBJECT, ViewMode,
};
pub use errors::DomainError;
pub use markup::strip_tags;
