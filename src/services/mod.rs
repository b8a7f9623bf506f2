// Service exports
pub mod auth;
pub mod memory;
pub mod postgres;
pub mod store;

pub use auth::{AccountService, AuthError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{MatchInsert, Store, StoreError};
