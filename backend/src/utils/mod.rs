//! Credential and token primitives.
//!
//! Password hashing, the symmetric cipher and the session token codec. None of
//! these touch storage or HTTP.

pub mod crypto;
pub mod password;
pub mod token;
