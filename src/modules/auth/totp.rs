use totp_rs::{Algorithm, Secret, TOTP};

use crate::TOTP_ISSUER;

/// Time-based one-time-password handling.
///
/// Standard parameters throughout: SHA-1, 6 digits, 30-second step, and a
/// skew tolerance of one step either side to absorb clock drift between the
/// server and the authenticator app.
#[derive(Clone)]
pub struct TotpVerifier {
    issuer: String,
}

impl Default for TotpVerifier {
    fn default() -> Self {
        Self::new(TOTP_ISSUER)
    }
}

impl TotpVerifier {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Generate a fresh random secret, base32-encoded for storage and for
    /// authenticator-app enrollment
    pub fn generate_secret(&self) -> String {
        Secret::generate_secret().to_encoded().to_string()
    }

    /// Build the otpauth:// provisioning URI for a stored secret.
    ///
    /// Returns `None` when the stored secret cannot be decoded; the caller
    /// treats that the same as any other invalid-secret situation.
    pub fn provisioning_uri(&self, secret: &str, account_name: &str) -> Option<String> {
        self.build_totp(secret, account_name).map(|totp| totp.get_url())
    }

    /// Verify a code against the current time with one step of tolerance
    pub fn verify(&self, secret: &str, code: &str, account_name: &str) -> bool {
        let Some(totp) = self.build_totp(secret, account_name) else {
            return false;
        };

        match totp.check_current(code) {
            Ok(valid) => valid,
            Err(err) => {
                // System clock problem; report failure instead of erroring so
                // the caller cannot distinguish it from a bad code
                log::warn!("TOTP verification failed to read system time: {}", err);
                false
            }
        }
    }

    /// Verify a code at a specific unix timestamp (deterministic testing)
    pub fn verify_at(&self, secret: &str, code: &str, account_name: &str, time: u64) -> bool {
        match self.build_totp(secret, account_name) {
            Some(totp) => totp.check(code, time),
            None => false,
        }
    }

    /// Generate the code valid at a specific unix timestamp
    pub fn generate_at(&self, secret: &str, account_name: &str, time: u64) -> Option<String> {
        self.build_totp(secret, account_name)
            .map(|totp| totp.generate(time))
    }

    /// Generate the code valid right now
    pub fn generate_current(&self, secret: &str, account_name: &str) -> Option<String> {
        let totp = self.build_totp(secret, account_name)?;
        totp.generate_current().ok()
    }

    fn build_totp(&self, secret: &str, account_name: &str) -> Option<TOTP> {
        let secret_bytes = Secret::Encoded(secret.to_string()).to_bytes().ok()?;
        TOTP::new(
            Algorithm::SHA1,
            6,
            1, // accept previous/current/next step
            30,
            secret_bytes,
            Some(self.issuer.clone()),
            account_name.to_string(),
        )
        .ok()
    }
}
