//! Fixed language catalogue. Implements LanguageProvider.

use crate::domain::{DomainError, Language};
use crate::ports::LanguageProvider;
use std::collections::BTreeMap;
use std::path::Path;

/// Languages known up front (config or JSON file) with one of them as site default.
#[derive(Debug, Clone)]
pub struct StaticLanguageProvider {
    languages: BTreeMap<String, Language>,
    default_code: String,
}

impl StaticLanguageProvider {
    /// The default code must be one of `languages`.
    pub fn new(
        languages: impl IntoIterator<Item = Language>,
        default_code: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let languages: BTreeMap<String, Language> = languages
            .into_iter()
            .map(|l| (l.code.clone(), l))
            .collect();
        let default_code = default_code.into();
        if !languages.contains_key(&default_code) {
            return Err(DomainError::Config(format!(
                "default language '{}' is not installed",
                default_code
            )));
        }
        Ok(Self {
            languages,
            default_code,
        })
    }

    /// English only.
    pub fn english() -> Self {
        let en = Language::new("en", "English");
        Self {
            languages: BTreeMap::from([(en.code.clone(), en)]),
            default_code: "en".to_string(),
        }
    }

    /// Load a JSON array of languages.
    pub async fn from_json_file(
        path: impl AsRef<Path>,
        default_code: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::LanguageProvider(format!("read {}: {}", path.display(), e))
        })?;
        let languages: Vec<Language> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::LanguageProvider(format!("parse {}: {}", path.display(), e))
        })?;
        Self::new(languages, default_code)
    }
}

#[async_trait::async_trait]
impl LanguageProvider for StaticLanguageProvider {
    async fn languages(&self) -> Result<BTreeMap<String, Language>, DomainError> {
        Ok(self.languages.clone())
    }

    async fn default_language(&self) -> Result<Language, DomainError> {
        self.languages
            .get(&self.default_code)
            .cloned()
            .ok_or_else(|| DomainError::UnknownLanguage {
                code: self.default_code.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TextDirection;
    use std::io::Write;

    #[tokio::test]
    async fn test_default_must_be_installed() {
        let err = StaticLanguageProvider::new(vec![Language::new("fr", "French")], "en").unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[tokio::test]
    async fn test_english_fallback() {
        let provider = StaticLanguageProvider::english();
        assert_eq!(provider.default_language().await.unwrap().code, "en");
        assert_eq!(provider.languages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"code":"en","name":"English"}},
                {{"code":"ar","name":"Arabic","native":"العربية","direction":"rtl"}}
            ]"#
        )
        .unwrap();

        let provider = StaticLanguageProvider::from_json_file(file.path(), "ar")
            .await
            .unwrap();
        let default = provider.default_language().await.unwrap();
        assert_eq!(default.code, "ar");
        assert_eq!(default.direction, TextDirection::Rtl);
        assert!(provider.languages().await.unwrap().contains_key("en"));
    }

    #[tokio::test]
    async fn test_bad_json_is_provider_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = StaticLanguageProvider::from_json_file(file.path(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::LanguageProvider(_)));
    }
}
