//! Password hashing and verification.

use bcrypt::{hash, verify};

use crate::errors::{AuthError, AuthResult};

/// Salted one-way password hashing backed by bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt work factor.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes a plaintext password. The random salt is embedded in the
    /// returned string, so two calls never produce the same output.
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if bcrypt rejects the cost or cannot
    /// obtain randomness.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        hash(password, self.cost).map_err(|e| AuthError::hashing(e.to_string()))
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A mismatch and a malformed hash both yield `false`.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the tests fast
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = hasher();
        let hashed = hasher.hash("TestPassword123!").unwrap();

        assert!(hashed.starts_with("$2b$04$"));
        assert_ne!(hashed, "TestPassword123!");
        assert!(hasher.verify("TestPassword123!", &hashed));
        assert!(!hasher.verify("WrongPassword123!", &hashed));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = hasher();
        let first = hasher.hash("pw").unwrap();
        let second = hasher.hash("pw").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("pw", &first));
        assert!(hasher.verify("pw", &second));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let hasher = hasher();
        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_invalid_cost_is_a_hashing_error() {
        let err = PasswordHasher::new(2).hash("pw").unwrap_err();
        assert!(matches!(err, AuthError::Hashing { .. }));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = hasher();
        let hashed = hasher.hash("kata-sandi-рассвет-123").unwrap();
        assert!(hasher.verify("kata-sandi-рассвет-123", &hashed));
        assert!(!hasher.verify("kata-sandi-рассвет-124", &hashed));
    }
}
