use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::error::SosError;
use crate::models::SosToken;

const TOKEN_BYTES: usize = 32;

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A token grants access only while active and strictly before expiry.
pub fn validate_access(token: &SosToken, now: DateTime<Utc>) -> Result<(), SosError> {
    if !token.is_active {
        return Err(SosError::TokenRevoked);
    }
    if now >= token.expires_at {
        return Err(SosError::TokenExpired);
    }
    Ok(())
}
