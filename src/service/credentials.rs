//! Password digests and signed bearer tokens.
//!
//! Passwords are stored as PBKDF2-HMAC-SHA256 digests with a random
//! per-user salt, encoded as `pbkdf2-sha256$<rounds>$<salt hex>$<digest hex>`.
//!
//! Tokens have the shape `v1.<user_id>.<expiry_unix>.<signature hex>` where
//! the signature is HMAC-SHA256 of everything before the last dot, keyed with
//! the configured secret.

use std::fmt;
use std::hint::black_box;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const DIGEST_SCHEME: &str = "pbkdf2-sha256";
const DIGEST_LEN: usize = 32;
const DEFAULT_ROUNDS: u32 = 600_000;
const TOKEN_VERSION: &str = "v1";

/// Salted password digests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    rounds: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl PasswordHasher {
    /// Creates a hasher using `rounds` PBKDF2 iterations (at least 1).
    #[must_use]
    pub fn with_rounds(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    /// Iterations applied to new digests.
    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Digests `password` with a fresh random salt.
    #[must_use]
    pub fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4();
        let digest = derive(password.as_bytes(), salt.as_bytes(), self.rounds);
        format!(
            "{DIGEST_SCHEME}${}${}${}",
            self.rounds,
            hex::encode(salt.as_bytes()),
            hex::encode(digest)
        )
    }

    /// Checks `password` against a stored digest. Malformed digests never
    /// verify.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(DIGEST_SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        let (Ok(rounds), Ok(salt), Ok(expected)) =
            (rounds.parse::<u32>(), hex::decode(salt), hex::decode(expected))
        else {
            return false;
        };
        if rounds == 0 {
            return false;
        }
        let actual = derive(password.as_bytes(), &salt, rounds);
        actual.as_slice().ct_eq(&expected).into()
    }

    /// Spends the same derivation cost as [`PasswordHasher::verify`] for a
    /// caller with no stored digest. Always `false`.
    #[must_use]
    pub fn verify_missing(&self, password: &str) -> bool {
        black_box(derive(password.as_bytes(), &[0u8; 16], self.rounds));
        false
    }
}

/// PBKDF2-HMAC-SHA256 with a 32-byte output.
fn derive(password: &[u8], salt: &[u8], rounds: u32) -> [u8; DIGEST_LEN] {
    pbkdf2::pbkdf2_hmac_array::<Sha256, DIGEST_LEN>(password, salt, rounds)
}

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Moment the token stops verifying.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HMAC-signed bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Creates a signer with the given secret and token lifetime in seconds.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issues a token for `user_id` valid from `now` for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the MAC cannot be keyed.
    pub fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<IssuedToken, ApiError> {
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let payload = format!("{TOKEN_VERSION}.{user_id}.{}", expires_at.timestamp());
        let signature = hex::encode(self.sign(payload.as_bytes())?.finalize().into_bytes());
        Ok(IssuedToken {
            token: format!("{payload}.{signature}"),
            expires_at,
        })
    }

    /// Verifies `token` at `now` and returns the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is malformed, has a
    /// bad signature, or has expired.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, ApiError> {
        let invalid = || ApiError::Unauthorized("invalid token".to_string());

        let (payload, signature) = token.rsplit_once('.').ok_or_else(invalid)?;
        let signature = hex::decode(signature).map_err(|_| invalid())?;
        self.sign(payload.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| invalid())?;

        let mut parts = payload.split('.');
        let (Some(TOKEN_VERSION), Some(user_id), Some(expiry), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let user_id = Uuid::parse_str(user_id).map_err(|_| invalid())?;
        let expiry = expiry.parse::<i64>().map_err(|_| invalid())?;
        if expiry <= now.timestamp() {
            return Err(ApiError::Unauthorized("token expired".to_string()));
        }
        Ok(user_id)
    }

    fn sign(&self, payload: &[u8]) -> Result<HmacSha256, ApiError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ApiError::Internal(format!("token signer: {e}")))?;
        mac.update(payload);
        Ok(mac)
    }
}
