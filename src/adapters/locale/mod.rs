//! Language catalogue adapters. Implement LanguageProvider.

pub mod static_languages;

pub use static_languages::StaticLanguageProvider;
