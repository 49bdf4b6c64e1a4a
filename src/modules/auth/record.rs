use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing configured yet; `begin_setup` is the only way forward
    Fresh,
    /// Secret generated and stored, owner has not yet proven possession
    PendingVerification,
    /// Setup confirmed; normal operation
    Active,
}

impl AuthState {
    pub fn is_active(&self) -> bool {
        matches!(self, AuthState::Active)
    }
}

/// The single persisted identity record.
///
/// Exactly one of these exists per deployment. All fields besides
/// `setup_completed` are populated together by `begin_setup` and cleared
/// together by `reset_auth`; a partially populated record with
/// `setup_completed == false` is the transient "setup started, not yet
/// verified" state.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IdentityRecord {
    pub setup_completed: bool,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub totp_secret: Option<String>,
    pub backup_codes: Vec<String>,
}

impl IdentityRecord {
    /// Derive the lifecycle state from the stored fields
    pub fn state(&self) -> AuthState {
        if self.setup_completed {
            AuthState::Active
        } else if self.totp_secret.is_some() {
            AuthState::PendingVerification
        } else {
            AuthState::Fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_fresh() {
        let record = IdentityRecord::default();
        assert_eq!(record.state(), AuthState::Fresh);
        assert!(!record.setup_completed);
        assert!(record.username.is_none());
        assert!(record.password_hash.is_none());
        assert!(record.totp_secret.is_none());
        assert!(record.backup_codes.is_empty());
    }

    #[test]
    fn test_pending_state_after_secret_generation() {
        let record = IdentityRecord {
            setup_completed: false,
            username: Some("alice".to_string()),
            password_hash: Some("hash".to_string()),
            totp_secret: Some("SECRET".to_string()),
            backup_codes: vec!["code-hash".to_string()],
        };
        assert_eq!(record.state(), AuthState::PendingVerification);
        assert!(!record.state().is_active());
    }

    #[test]
    fn test_active_state_once_confirmed() {
        let record = IdentityRecord {
            setup_completed: true,
            username: Some("alice".to_string()),
            password_hash: Some("hash".to_string()),
            totp_secret: Some("SECRET".to_string()),
            backup_codes: vec![],
        };
        assert_eq!(record.state(), AuthState::Active);
        assert!(record.state().is_active());
    }

    #[test]
    fn test_record_survives_json_round_trip() {
        let record = IdentityRecord {
            setup_completed: true,
            username: Some("alice".to_string()),
            password_hash: Some("abc$def".to_string()),
            totp_secret: Some("JBSWY3DPEHPK3PXP".to_string()),
            backup_codes: vec!["h1".to_string(), "h2".to_string()],
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: IdentityRecord = serde_json::from_str(&json).unwrap();

        assert!(parsed.setup_completed);
        assert_eq!(parsed.username.as_deref(), Some("alice"));
        assert_eq!(parsed.backup_codes.len(), 2);
        // Stored order must be preserved; backup codes are consumed in order
        assert_eq!(parsed.backup_codes[0], "h1");
        assert_eq!(parsed.backup_codes[1], "h2");
    }
}
