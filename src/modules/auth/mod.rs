pub mod backup;
pub mod error;
pub mod manager;
pub mod password;
pub mod record;
pub mod store;
pub mod totp;

// Re-export the main types and functions
pub use error::AuthError;
pub use manager::{AuthManager, SetupBundle};
pub use record::{AuthState, IdentityRecord};
pub use store::{FileStore, MemoryStore, RecordStore};
pub use totp::TotpVerifier;
