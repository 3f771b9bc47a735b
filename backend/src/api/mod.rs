//! Shared HTTP plumbing for the API surface.
//!
//! Authentication routes live in `crate::auth`; this module only holds the
//! response envelope and error mapping they share.

pub mod common;
