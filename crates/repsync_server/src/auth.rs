//! Authentication support for the sync server.
//!
//! This module provides token-based authentication using HMAC-SHA256.
//! Tokens include a timestamp for expiration checking.
//!
//! ## Token Format
//!
//! Tokens are composed of:
//! - 2 bytes: user id length (big-endian)
//! - N bytes: user id (UTF-8)
//! - 8 bytes: timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature
//!
//! The token carries the caller's identity; validation returns the
//! authenticated [`UserId`].

use crate::error::{ServerError, ServerResult};
use hmac::{Hmac, Mac};
use repsync_protocol::UserId;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LEN: usize = 32;
const TIMESTAMP_LEN: usize = 8;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Token validator for incoming requests.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates a session token for a user.
    ///
    /// The token is returned as raw bytes; transports encode it as
    /// they see fit (base64, hex).
    pub fn create_token(&self, user_id: &UserId) -> Vec<u8> {
        let user = user_id.as_str().as_bytes();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut data = Vec::with_capacity(2 + user.len() + TIMESTAMP_LEN + SIGNATURE_LEN);
        data.extend_from_slice(&(user.len() as u16).to_be_bytes());
        data.extend_from_slice(user);
        data.extend_from_slice(&timestamp.to_be_bytes());

        let signature = self.sign(&data);
        data.extend_from_slice(&signature);
        data
    }

    /// Validates a token and returns the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` for malformed, tampered, or expired
    /// tokens.
    pub fn validate_token(&self, token: &[u8]) -> ServerResult<UserId> {
        if token.len() < 2 + TIMESTAMP_LEN + SIGNATURE_LEN {
            return Err(ServerError::NotAuthorized("Invalid token length".into()));
        }

        let user_len = u16::from_be_bytes([token[0], token[1]]) as usize;
        let body_len = 2 + user_len + TIMESTAMP_LEN;
        if token.len() != body_len + SIGNATURE_LEN {
            return Err(ServerError::NotAuthorized("Invalid token length".into()));
        }

        // Verify signature before trusting any field.
        let signature = &token[body_len..];
        let expected = self.sign(&token[..body_len]);
        if signature != expected.as_slice() {
            return Err(ServerError::NotAuthorized("Invalid signature".into()));
        }

        // Check expiration.
        let timestamp_bytes: [u8; TIMESTAMP_LEN] = token[2 + user_len..body_len]
            .try_into()
            .map_err(|_| ServerError::NotAuthorized("Invalid token length".into()))?;
        let timestamp = u64::from_be_bytes(timestamp_bytes);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let expiry_millis = self.config.token_expiry.as_millis() as u64;
        if now > timestamp + expiry_millis {
            return Err(ServerError::NotAuthorized("Token expired".into()));
        }

        let user = std::str::from_utf8(&token[2..2 + user_len])
            .map_err(|_| ServerError::NotAuthorized("Invalid user id".into()))?;
        Ok(UserId::new(user))
    }

    /// Signs data with HMAC-SHA256.
    fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.config.secret).expect("HMAC can take key of any size");
        mac.update(data);
        let result = mac.finalize();
        result.into_bytes().into()
    }
}
