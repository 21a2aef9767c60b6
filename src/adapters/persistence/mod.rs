//! Account storage adapters. Implement AccountStore.

pub mod memory;
pub mod sqlite_accounts;

pub use memory::MemoryAccountStore;
pub use sqlite_accounts::SqliteAccountStore;
