//! SQLite-backed account store via libsql. Implements AccountStore.
//!
//! Single `users` table keyed by uid. Missing rows are an error, never a default account.

use crate::domain::{Account, DomainError};
use crate::ports::AccountStore;
use libsql::{Database, params};
use std::path::Path;
use tracing::{debug, info};

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    uid INTEGER PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    mail TEXT NOT NULL DEFAULT '',
    language TEXT NOT NULL DEFAULT ''
)"#;

pub struct SqliteAccountStore {
    db: Database,
}

impl SqliteAccountStore {
    /// Open (or create) the database file and ensure the schema exists.
    /// The returned store is safe to share via Arc.
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DomainError::AccountStore(e.to_string()))?;
        }
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;
        conn.execute(USERS_TABLE, ())
            .await
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;

        info!(path = %db_path.display(), "account store connected");

        Ok(Self { db })
    }

    /// Upsert every account from a JSON array. Returns how many were written.
    pub async fn seed_from_json(&self, path: impl AsRef<Path>) -> Result<usize, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::AccountStore(format!("read {}: {}", path.display(), e)))?;
        let accounts: Vec<Account> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::AccountStore(format!("parse {}: {}", path.display(), e)))?;
        for account in &accounts {
            self.upsert_account(account).await?;
        }
        info!(path = %path.display(), count = accounts.len(), "seeded accounts");
        Ok(accounts.len())
    }

    /// Insert or replace an account.
    pub async fn upsert_account(&self, account: &Account) -> Result<(), DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO users (uid, name, mail, language)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (uid) DO UPDATE SET
                name = excluded.name,
                mail = excluded.mail,
                language = excluded.language
            "#,
            params![
                account.uid,
                account.name.as_str(),
                account.mail.as_str(),
                account.language.as_str()
            ],
        )
        .await
        .map_err(|e| DomainError::AccountStore(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountStore for SqliteAccountStore {
    async fn load_account(&self, uid: i64) -> Result<Account, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT uid, name, mail, language FROM users WHERE uid = ?1",
                params![uid],
            )
            .await
            .map_err(|e| DomainError::AccountStore(e.to_string()))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::AccountStore(e.to_string()))?
        else {
            return Err(DomainError::AccountStore(format!("no account with uid {uid}")));
        };

        let account = Account {
            uid: row.get(0).map_err(|e| DomainError::AccountStore(e.to_string()))?,
            name: row.get(1).map_err(|e| DomainError::AccountStore(e.to_string()))?,
            mail: row.get(2).map_err(|e| DomainError::AccountStore(e.to_string()))?,
            language: row.get(3).map_err(|e| DomainError::AccountStore(e.to_string()))?,
        };
        debug!(uid, "account lookup (sqlite)");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteAccountStore::connect(dir.path().join("nested/accounts.db"))
            .await
            .unwrap();

        let mut alice = Account {
            uid: 42,
            name: "alice".into(),
            mail: "alice@x.com".into(),
            language: "fr".into(),
        };
        store.upsert_account(&alice).await.unwrap();
        assert_eq!(store.load_account(42).await.unwrap(), alice);

        alice.language = "und".into();
        store.upsert_account(&alice).await.unwrap();
        assert_eq!(store.load_account(42).await.unwrap().language, "und");
    }

    #[tokio::test]
    async fn test_seed_from_json() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("accounts.json");
        std::fs::File::create(&seed)
            .unwrap()
            .write_all(br#"[{"uid":1,"mail":"a@x.com","language":"fr"},{"uid":2,"name":"bob"}]"#)
            .unwrap();
        let store = SqliteAccountStore::connect(dir.path().join("accounts.db"))
            .await
            .unwrap();

        assert_eq!(store.seed_from_json(&seed).await.unwrap(), 2);
        assert_eq!(store.load_account(1).await.unwrap().language, "fr");
        assert_eq!(store.load_account(2).await.unwrap().name, "bob");
    }

    #[tokio::test]
    async fn test_missing_account_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteAccountStore::connect(dir.path().join("accounts.db"))
            .await
            .unwrap();

        assert!(matches!(
            store.load_account(7).await,
            Err(DomainError::AccountStore(_))
        ));
    }
}
