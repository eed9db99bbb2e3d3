//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, signed tokens)
//! - Password hashing capability (Argon2id, NIST SP 800-63B policy)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
