//! Credential primitives: password hashing and signed identity tokens.

pub mod password;
pub mod token;
