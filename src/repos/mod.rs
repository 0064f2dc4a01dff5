pub mod credential_store;
pub mod error;
pub mod memory_store;
pub mod pg_store;

pub use credential_store::{CredentialStore, RowLookup, ScalarLookup, Write};
pub use memory_store::MemoryCredentialStore;
pub use pg_store::PgCredentialStore;
