use std::sync::{Mutex, MutexGuard};

use super::backup::{find_matching_code, generate_backup_codes};
use super::error::AuthError;
use super::password::{hash_password, verify_password};
use super::record::{AuthState, IdentityRecord};
use super::store::RecordStore;
use super::totp::TotpVerifier;
use crate::modules::utils::logging::log_auth_event;
use crate::{MIN_PASSWORD_LEN, MIN_USERNAME_LEN};

/// Everything the owner must capture during setup, returned exactly once.
///
/// None of these values are persisted or logged in plaintext; losing them
/// means falling back to `reset_auth`.
#[derive(Debug)]
pub struct SetupBundle {
    /// Base32 TOTP secret, for manual authenticator entry
    pub secret: String,
    /// otpauth:// URI for authenticator-app enrollment
    pub provisioning_uri: String,
    /// Ten single-use recovery codes
    pub backup_codes: Vec<String>,
}

/// The credential and second-factor manager.
///
/// Owns the one identity record and mediates every transition against it:
/// setup, setup confirmation, login, password change, backup-code
/// regeneration, and reset. All operations take the record lock for their
/// whole read-validate-mutate-persist cycle, so concurrent callers cannot
/// race a backup code into double use or interleave setup with reset.
///
/// Mutations are persisted before the in-memory record is updated; a storage
/// failure leaves memory and disk agreeing on the previous state.
pub struct AuthManager {
    store: Box<dyn RecordStore>,
    record: Mutex<IdentityRecord>,
    totp: TotpVerifier,
}

impl AuthManager {
    /// Load the persisted record (or a fresh one) from the given store
    pub fn new(store: Box<dyn RecordStore>) -> Result<Self, AuthError> {
        let record = store.load()?;
        Ok(Self {
            store,
            record: Mutex::new(record),
            totp: TotpVerifier::default(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> AuthState {
        self.lock().state()
    }

    /// Number of unused backup codes left
    pub fn backup_codes_remaining(&self) -> usize {
        self.lock().backup_codes.len()
    }

    /// Start first-time setup.
    ///
    /// Only valid from `Fresh`. Generates the TOTP secret and ten backup
    /// codes, hashes the password and the codes, and persists the record
    /// with setup still unconfirmed. The plaintext secret, provisioning URI,
    /// and codes are returned to the caller exactly once.
    pub fn begin_setup(&self, username: &str, password: &str) -> Result<SetupBundle, AuthError> {
        let mut guard = self.lock();
        if guard.state() != AuthState::Fresh {
            return Err(AuthError::AlreadyInitialized);
        }

        if username.len() < MIN_USERNAME_LEN {
            return Err(AuthError::InvalidInput {
                field: "username",
                reason: format!("must be at least {} characters", MIN_USERNAME_LEN),
            });
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput {
                field: "password",
                reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }

        let secret = self.totp.generate_secret();
        let provisioning_uri = self
            .totp
            .provisioning_uri(&secret, username)
            .expect("freshly generated secret is valid base32");
        let (backup_codes, hashed_codes) = generate_backup_codes();

        let record = IdentityRecord {
            setup_completed: false, // flipped by confirm_setup
            username: Some(username.to_string()),
            password_hash: Some(hash_password(password)),
            totp_secret: Some(secret.clone()),
            backup_codes: hashed_codes,
        };
        self.commit(&mut guard, record)?;

        log_auth_event("begin_setup", username, true, None);
        Ok(SetupBundle {
            secret,
            provisioning_uri,
            backup_codes,
        })
    }

    /// Confirm setup by proving possession of the second factor.
    ///
    /// Only a live TOTP code is accepted here; backup codes are a recovery
    /// mechanism for after activation, not a substitute for enrolling the
    /// authenticator. Failure leaves the record untouched and the operation
    /// retriable; rate limiting is the caller's concern.
    pub fn confirm_setup(&self, code: &str) -> Result<(), AuthError> {
        let mut guard = self.lock();
        match guard.state() {
            AuthState::Fresh => return Err(AuthError::NotInitialized),
            AuthState::Active => return Err(AuthError::AlreadyInitialized),
            AuthState::PendingVerification => {}
        }

        let secret = guard
            .totp_secret
            .clone()
            .expect("pending state implies a stored secret");
        let username = guard.username.clone().unwrap_or_default();

        if !self.totp.verify(&secret, code, &username) {
            log_auth_event("confirm_setup", &username, false, Some("invalid code"));
            return Err(AuthError::InvalidCode);
        }

        let mut updated = guard.clone();
        updated.setup_completed = true;
        self.commit(&mut guard, updated)?;

        log_auth_event("confirm_setup", &username, true, None);
        Ok(())
    }

    /// Validate a login attempt: credentials first, then the second factor.
    ///
    /// Username and password failures report the same generic error so a
    /// caller cannot learn which check failed. The code is checked against
    /// the live TOTP first and then, on miss, against the stored backup-code
    /// hashes in order; a matching backup code is consumed permanently
    /// before success is reported.
    pub fn verify_login(
        &self,
        username: &str,
        password: &str,
        code: &str,
    ) -> Result<(), AuthError> {
        let mut guard = self.lock();
        if guard.state() != AuthState::Active {
            return Err(AuthError::NotInitialized);
        }

        let stored_username = guard
            .username
            .clone()
            .expect("active state implies a stored username");
        let stored_hash = guard
            .password_hash
            .clone()
            .expect("active state implies a stored password hash");

        if username != stored_username || !verify_password(password, &stored_hash) {
            log_auth_event("login", username, false, Some("bad credentials"));
            return Err(AuthError::InvalidCredentials);
        }

        let secret = guard
            .totp_secret
            .clone()
            .expect("active state implies a stored secret");

        if self.totp.verify(&secret, code, username) {
            log_auth_event("login", username, true, None);
            return Ok(());
        }

        // TOTP missed; fall through to the single-use backup codes
        if let Some(idx) = find_matching_code(code, &guard.backup_codes) {
            let mut updated = guard.clone();
            updated.backup_codes.remove(idx);
            self.commit(&mut guard, updated)?;

            log_auth_event("login", username, true, Some("backup code consumed"));
            return Ok(());
        }

        log_auth_event("login", username, false, Some("invalid code"));
        Err(AuthError::InvalidCode)
    }

    /// Change the password. Requires the old password and a live TOTP code;
    /// backup codes are not accepted for this operation.
    pub fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        code: &str,
    ) -> Result<(), AuthError> {
        let mut guard = self.lock();
        if guard.state() != AuthState::Active {
            return Err(AuthError::NotInitialized);
        }

        let username = guard.username.clone().unwrap_or_default();
        let stored_hash = guard
            .password_hash
            .clone()
            .expect("active state implies a stored password hash");
        if !verify_password(old_password, &stored_hash) {
            log_auth_event("change_password", &username, false, Some("bad credentials"));
            return Err(AuthError::InvalidCredentials);
        }

        let secret = guard
            .totp_secret
            .clone()
            .expect("active state implies a stored secret");
        if !self.totp.verify(&secret, code, &username) {
            log_auth_event("change_password", &username, false, Some("invalid code"));
            return Err(AuthError::InvalidCode);
        }

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput {
                field: "new_password",
                reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
            });
        }

        let mut updated = guard.clone();
        updated.password_hash = Some(hash_password(new_password));
        self.commit(&mut guard, updated)?;

        log_auth_event("change_password", &username, true, None);
        Ok(())
    }

    /// Replace all backup codes with ten fresh ones.
    ///
    /// Requires the password and a live TOTP code. Every previously issued,
    /// unused code becomes permanently invalid the moment this succeeds.
    pub fn regenerate_backup_codes(
        &self,
        password: &str,
        code: &str,
    ) -> Result<Vec<String>, AuthError> {
        let mut guard = self.lock();
        if guard.state() != AuthState::Active {
            return Err(AuthError::NotInitialized);
        }

        let username = guard.username.clone().unwrap_or_default();
        let stored_hash = guard
            .password_hash
            .clone()
            .expect("active state implies a stored password hash");
        if !verify_password(password, &stored_hash) {
            log_auth_event("regenerate_codes", &username, false, Some("bad credentials"));
            return Err(AuthError::InvalidCredentials);
        }

        let secret = guard
            .totp_secret
            .clone()
            .expect("active state implies a stored secret");
        if !self.totp.verify(&secret, code, &username) {
            log_auth_event("regenerate_codes", &username, false, Some("invalid code"));
            return Err(AuthError::InvalidCode);
        }

        let (backup_codes, hashed_codes) = generate_backup_codes();
        let mut updated = guard.clone();
        updated.backup_codes = hashed_codes;
        self.commit(&mut guard, updated)?;

        log_auth_event("regenerate_codes", &username, true, None);
        Ok(backup_codes)
    }

    /// Discard the record entirely and return to `Fresh`.
    ///
    /// Irreversible: destroys the secret, the password hash, and all
    /// recovery codes. Callers must gate this behind an out-of-band
    /// confirmation; the manager itself applies no safeguard.
    pub fn reset_auth(&self) -> Result<(), AuthError> {
        let mut guard = self.lock();
        self.store.clear()?;
        *guard = IdentityRecord::default();

        log_auth_event("reset_auth", "", true, Some("record destroyed"));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, IdentityRecord> {
        // Operations never panic while holding the lock
        self.record.lock().expect("auth record lock poisoned")
    }

    /// Persist first, then update memory; a save failure leaves both sides
    /// on the previous state
    fn commit(&self, current: &mut IdentityRecord, updated: IdentityRecord) -> Result<(), AuthError> {
        self.store.save(&updated)?;
        *current = updated;
        Ok(())
    }
}
