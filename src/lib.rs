// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, utils};

// Re-export commonly used types
pub use modules::auth::error::AuthError;
pub use modules::auth::manager::{AuthManager, SetupBundle};
pub use modules::auth::record::{AuthState, IdentityRecord};
pub use modules::auth::store::{FileStore, MemoryStore, RecordStore};

// Constants
pub const AUTH_FILE: &str = "auth_record.json";
pub const TOTP_ISSUER: &str = "Authkeep";
pub const BACKUP_CODE_COUNT: usize = 10;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
