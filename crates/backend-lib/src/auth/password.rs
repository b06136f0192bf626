// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

/// Default bcrypt cost factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Default scrypt work factor (N = 2^15)
pub const DEFAULT_SCRYPT_LOG_N: u8 = 15;

/// Adaptive hashing scheme used for new password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum HashScheme {
    /// bcrypt with the given cost factor
    Bcrypt { cost: u32 },
    /// scrypt with N = 2^log_n, r = 8, p = 1
    Scrypt { log_n: u8 },
}

impl Default for HashScheme {
    fn default() -> Self {
        HashScheme::Bcrypt { cost: DEFAULT_BCRYPT_COST }
    }
}

/// Errors raised while hashing
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("scrypt error: {0}")]
    Scrypt(String),
}

/// Hash a password with a fresh random salt
pub fn hash_password(plain: &str, scheme: HashScheme) -> Result<String, PasswordError> {
    match scheme {
        HashScheme::Bcrypt { cost } => Ok(bcrypt::hash(plain, cost)?),
        HashScheme::Scrypt { log_n } => {
            let params =
                Params::new(log_n, 8, 1, 32).map_err(|e| PasswordError::Scrypt(e.to_string()))?;
            let salt = SaltString::generate(&mut OsRng);
            let hash = Scrypt
                .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
                .map_err(|e| PasswordError::Scrypt(e.to_string()))?
                .to_string();
            Ok(hash)
        },
    }
}

/// Verify a password against a stored hash.
///
/// The scheme is read from the hash itself, so hashes produced under an
/// earlier configuration keep verifying. Malformed hashes never match.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    if is_bcrypt_hash(hash) {
        return bcrypt::verify(plain, hash).unwrap_or(false);
    }

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, scheme: HashScheme) -> Result<String, PasswordError> {
    let hash = hash_password(plain, scheme);
    plain.zeroize();
    hash
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"].iter().any(|prefix| hash.starts_with(prefix))
}
