//! Infrastructure adapters. Implement outbound ports.
//!
//! Account storage, language catalogue, mail transports. Map errors to DomainError.

pub mod locale;
pub mod mail;
pub mod persistence;
