//! In-memory AccountStore. Seeded from a list or a JSON file.

use crate::domain::{Account, DomainError};
use crate::ports::AccountStore;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub struct MemoryAccountStore {
    accounts: HashMap<i64, Account>,
}

impl MemoryAccountStore {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.uid, a)).collect(),
        }
    }

    /// Load a JSON array of accounts.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::AccountStore(format!("read {}: {}", path.display(), e)))?;
        let accounts: Vec<Account> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::AccountStore(format!("parse {}: {}", path.display(), e)))?;
        Ok(Self::new(accounts))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn load_account(&self, uid: i64) -> Result<Account, DomainError> {
        debug!(uid, "account lookup (memory)");
        self.accounts
            .get(&uid)
            .cloned()
            .ok_or_else(|| DomainError::AccountStore(format!("no account with uid {uid}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_lookup_and_missing() {
        let store = MemoryAccountStore::new(vec![Account {
            uid: 3,
            name: "carol".into(),
            mail: "c@x.com".into(),
            language: "fr".into(),
        }]);

        assert_eq!(store.load_account(3).await.unwrap().mail, "c@x.com");
        assert!(matches!(
            store.load_account(4).await,
            Err(DomainError::AccountStore(_))
        ));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"uid":1,"mail":"a@x.com","language":"fr"}},{{"uid":2,"name":"bob"}}]"#
        )
        .unwrap();

        let store = MemoryAccountStore::from_json_file(file.path()).await.unwrap();
        assert_eq!(store.len(), 2);
        let bob = store.load_account(2).await.unwrap();
        assert_eq!(bob.name, "bob");
        assert!(bob.mail.is_empty());
    }
}
