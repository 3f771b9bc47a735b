//! Session token encoding and validation.
//!
//! Tokens carry the subject, role and issue/expiry timestamps. Two schemes are
//! supported:
//!
//! - [`TokenScheme::Encrypted`]: claims sealed with AES-256-GCM, prefixed with
//!   [`ENCRYPTED_HEADER`] which is bound to the ciphertext as associated data.
//! - [`TokenScheme::Signed`]: HS256 JWT, readable by anyone holding the token.
//!
//! Both schemes use the same 32-byte secret and both produce URL-safe strings.
//! Expiry is always checked here against an explicit clock, never by the JWT
//! library.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AuthError, AuthResult};
use crate::utils::crypto::{SecretKey, TokenCipher};

/// Version and purpose prefix of encrypted tokens.
pub const ENCRYPTED_HEADER: &str = "v1.local.";

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity the token was issued to
    pub sub: String,
    /// Role of the identity at issuance
    pub role: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// A token is expired once `now` is strictly past `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScheme {
    Encrypted,
    Signed,
}

impl FromStr for TokenScheme {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "encrypted" | "local" => Ok(TokenScheme::Encrypted),
            "signed" | "jwt" => Ok(TokenScheme::Signed),
            _ => Err(format!("Invalid token scheme: {}", input)),
        }
    }
}

impl fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScheme::Encrypted => write!(f, "encrypted"),
            TokenScheme::Signed => write!(f, "signed"),
        }
    }
}

/// Issues and validates session tokens with a fixed key.
pub struct TokenCodec {
    scheme: TokenScheme,
    cipher: TokenCipher,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: &SecretKey, scheme: TokenScheme) -> Self {
        let encoding_key = EncodingKey::from_secret(key.as_bytes());
        let decoding_key = DecodingKey::from_secret(key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        TokenCodec {
            scheme,
            cipher: TokenCipher::new(key),
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn scheme(&self) -> TokenScheme {
        self.scheme
    }

    /// Issues a token for `subject` valid for `ttl` from now.
    pub fn encode(&self, subject: &str, role: &str, ttl: Duration) -> AuthResult<String> {
        self.encode_at(subject, role, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn encode_at(
        &self,
        subject: &str,
        role: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        if ttl <= Duration::zero() {
            return Err(AuthError::token_issuance("ttl must be positive"));
        }

        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::token_issuance("ttl overflows the clock"))?;

        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        match self.scheme {
            TokenScheme::Encrypted => self.seal(&claims),
            TokenScheme::Signed => encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
                .map_err(|e| AuthError::token_issuance(format!("Token signing failed: {}", e))),
        }
    }

    /// Validates a token and returns its claims.
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        self.decode_at(token, Utc::now())
    }

    /// Validates a token as if the current time were `now`.
    ///
    /// Authenticity is checked before expiry, so a tampered token is always
    /// `InvalidToken` even when its claimed expiry has passed.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let claims = match self.scheme {
            TokenScheme::Encrypted => self.open(token)?,
            TokenScheme::Signed => decode::<Claims>(token, &self.decoding_key, &self.validation)
                .map(|token_data| token_data.claims)
                .map_err(|_| AuthError::InvalidToken)?,
        };

        if claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    fn seal(&self, claims: &Claims) -> AuthResult<String> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| AuthError::token_issuance(format!("Claims serialization failed: {}", e)))?;

        let sealed = self
            .cipher
            .seal(ENCRYPTED_HEADER.as_bytes(), &payload)
            .map_err(|e| AuthError::token_issuance(e.to_string()))?;

        Ok(format!("{}{}", ENCRYPTED_HEADER, URL_SAFE_NO_PAD.encode(sealed)))
    }

    fn open(&self, token: &str) -> AuthResult<Claims> {
        let body = token
            .strip_prefix(ENCRYPTED_HEADER)
            .ok_or(AuthError::InvalidToken)?;

        let sealed = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| AuthError::InvalidToken)?;

        let payload = self
            .cipher
            .open(ENCRYPTED_HEADER.as_bytes(), &sealed)
            .map_err(|_| AuthError::InvalidToken)?;

        serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)
    }
}
