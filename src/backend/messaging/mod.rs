//! Messaging Module
//!
//! Persistence of direct messages. The relay only sees the
//! [`MessageStore`] trait; the concrete store is chosen at startup.
//!
//! - **`store`** - The store contract and its error type
//! - **`memory`** - In-process store (fallback and tests)
//! - **`db`** - PostgreSQL store

pub mod db;
pub mod memory;
pub mod store;

pub use db::PgMessageStore;
pub use memory::InMemoryMessageStore;
pub use store::{MessageStore, SharedMessageStore, StoreError};
