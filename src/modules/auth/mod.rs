pub mod registration;
pub mod session;
pub mod store;
pub mod tokens;
pub mod user_interface;

// Re-export the main types and functions
pub use registration::{AccountRole, RegisterRequest};
pub use session::{SessionInfo, SessionManager};
pub use store::{CredentialStore, FileStore, KeyValueStore, MemoryStore, StoreError};
pub use tokens::Claims;
