//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random secrets, constant-time comparison)
//! - Password hashing (Argon2id)
//! - Bearer token signing and verification (HS256 JWT)
//! - Request header helpers

pub mod client;
pub mod crypto;
pub mod password;
pub mod token;
