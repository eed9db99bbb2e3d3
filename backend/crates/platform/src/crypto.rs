//! Cryptographic Utilities
//!
//! HMAC-SHA256 and a compact signed-token format (`payload.mac`, both
//! URL-safe base64) used for the identity cookie.

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("signing key must be {KEY_LEN} bytes")]
    InvalidKey,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn to_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

/// Parse a base64 secret (standard or URL-safe alphabet) into a signing key
pub fn key_from_base64(s: &str) -> Result<[u8; KEY_LEN], TokenError> {
    let s = s.trim();
    let bytes = STANDARD
        .decode(s)
        .or_else(|_| URL_SAFE_NO_PAD.decode(s.trim_end_matches('=')))
        .map_err(|_| TokenError::InvalidKey)?;
    bytes.try_into().map_err(|_| TokenError::InvalidKey)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8; KEY_LEN], data: &[u8]) -> [u8; 32] {
    // HMAC: H((K XOR opad) || H((K XOR ipad) || message))
    let mut o_key_pad = [0x5cu8; 64];
    let mut i_key_pad = [0x36u8; 64];

    for i in 0..KEY_LEN {
        o_key_pad[i] ^= key[i];
        i_key_pad[i] ^= key[i];
    }

    let mut inner_hash = Sha256::new();
    inner_hash.update(i_key_pad);
    inner_hash.update(data);
    let inner_result = inner_hash.finalize();

    let mut outer_hash = Sha256::new();
    outer_hash.update(o_key_pad);
    outer_hash.update(inner_result);
    outer_hash.finalize().into()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Sign `payload`, producing `base64(payload).base64(mac)`.
pub fn sign(key: &[u8; KEY_LEN], payload: &[u8]) -> String {
    let mac = hmac_sha256(key, payload);
    format!("{}.{}", to_base64(payload), to_base64(&mac))
}

/// Verify a token produced by [`sign`] and return its payload.
pub fn verify(key: &[u8; KEY_LEN], token: &str) -> Result<Vec<u8>, TokenError> {
    let (payload_b64, mac_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let payload = from_base64(payload_b64).map_err(|_| TokenError::Malformed)?;
    let mac = from_base64(mac_b64).map_err(|_| TokenError::Malformed)?;

    if !constant_time_eq(&hmac_sha256(key, &payload), &mac) {
        return Err(TokenError::BadSignature);
    }
    Ok(payload)
}
