//! Authentication and invitation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the local identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub access_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            access_token_lifetime_secs: 3600,
            jwt_issuer: "barangay".into(),
            pepper: None,
            min_password_length: 8,
        }
    }
}

/// Configuration for the invitation ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationConfig {
    /// Invitation lifetime in seconds (default: 604_800 = 7 days).
    pub ttl_secs: u64,
    /// Number of symbols in a code. Values below 6 are raised to 6.
    pub code_length: usize,
    /// Attempts at drawing an unused code before giving up.
    pub max_code_attempts: u32,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 604_800,
            code_length: 6,
            max_code_attempts: 5,
        }
    }
}

impl InvitationConfig {
    pub fn effective_code_length(&self) -> usize {
        self.code_length.max(crate::code::MIN_CODE_LENGTH)
    }
}
