//! Admin credential hashing and signed session tokens
//!
//! # Passwords
//!
//! Stored as `password_salt` (16 random bytes, hex) and `password_hash`
//! (iterated SHA-256 over salt + password, hex). Plaintext never reaches the
//! database and comparisons are constant time.
//!
//! # Sessions
//!
//! A session is an opaque cookie value
//! `"{admin_id}.{generation}.{expires_at_ms}.{sig}"` where `sig` is
//! SHA-256 of everything before it plus the secret, as 64 hex characters.
//! The secret is generated on first start and stored in the `settings`
//! table under `session_secret`, so tokens survive restarts. `generation`
//! mirrors `admins.session_generation`; logout bumps the column, which
//! retires every token issued before it.
//!
//! Everything except [`load_session_secret`] is a pure function.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::settings::{get_setting, insert_setting_if_absent};
use crate::Result;

/// SHA-256 iterations applied to every password
pub const PASSWORD_HASH_ROUNDS: u32 = 10_000;

/// `settings` key holding the session signing secret
pub const SESSION_SECRET_KEY: &str = "session_secret";

// ========================================
// Password Hashing
// ========================================

/// Fresh random salt, 16 bytes rendered as 32 hex characters
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hash a password with the given salt
///
/// # Examples
///
/// ```
/// use wbid_common::auth::{hash_password, verify_password};
///
/// let hash = hash_password("heron", "00ff00ff");
/// assert_eq!(hash.len(), 64);
/// assert!(verify_password("heron", "00ff00ff", &hash));
/// assert!(!verify_password("egret", "00ff00ff", &hash));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..PASSWORD_HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

/// Check a candidate password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), expected_hash.as_bytes())
}

/// Byte comparison whose running time does not depend on where inputs differ
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Session Tokens
// ========================================

/// Verified contents of a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub admin_id: i64,
    pub generation: i64,
    pub expires_at_ms: i64,
}

/// Reasons a session token is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Not four dot-separated fields, or numbers failed to parse
    Malformed,

    /// Signature does not match payload + secret
    InvalidSignature,

    /// Token was valid but its lifetime has passed
    Expired { expires_at_ms: i64, now_ms: i64 },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Malformed => write!(f, "Malformed session token"),
            SessionError::InvalidSignature => write!(f, "Invalid session signature"),
            SessionError::Expired { expires_at_ms, now_ms } => write!(
                f,
                "Session expired {}ms ago",
                now_ms.saturating_sub(*expires_at_ms)
            ),
        }
    }
}

impl std::error::Error for SessionError {}

/// Current wall-clock time in Unix epoch milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn sign(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a token for `admin_id` at session `generation`, expiring at
/// `expires_at_ms`
///
/// # Examples
///
/// ```
/// use wbid_common::auth::{issue_session_token, verify_session_token};
///
/// let token = issue_session_token(7, 0, 2_000, "secret");
/// let claims = verify_session_token(&token, "secret", 1_000).unwrap();
/// assert_eq!(claims.admin_id, 7);
/// assert_eq!(claims.generation, 0);
///
/// // Wrong secret or past expiry are refused
/// assert!(verify_session_token(&token, "other", 1_000).is_err());
/// assert!(verify_session_token(&token, "secret", 2_001).is_err());
/// ```
pub fn issue_session_token(admin_id: i64, generation: i64, expires_at_ms: i64, secret: &str) -> String {
    let payload = format!("{}.{}.{}", admin_id, generation, expires_at_ms);
    let sig = sign(&payload, secret);
    format!("{}.{}", payload, sig)
}

/// Verify signature and expiry of a token at time `now_ms`
///
/// The generation is only checked for integrity here; comparing it with
/// the admin's current generation needs the database.
pub fn verify_session_token(
    token: &str,
    secret: &str,
    now_ms: i64,
) -> std::result::Result<SessionClaims, SessionError> {
    let (payload, sig) = token.trim().rsplit_once('.').ok_or(SessionError::Malformed)?;
    let mut fields = payload.split('.');
    let (Some(id_part), Some(gen_part), Some(exp_part), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(SessionError::Malformed);
    };

    let admin_id: i64 = id_part.parse().map_err(|_| SessionError::Malformed)?;
    let generation: i64 = gen_part.parse().map_err(|_| SessionError::Malformed)?;
    let expires_at_ms: i64 = exp_part.parse().map_err(|_| SessionError::Malformed)?;

    let calculated = sign(payload, secret);
    if !constant_time_eq(calculated.as_bytes(), sig.as_bytes()) {
        return Err(SessionError::InvalidSignature);
    }

    if now_ms > expires_at_ms {
        return Err(SessionError::Expired { expires_at_ms, now_ms });
    }

    Ok(SessionClaims {
        admin_id,
        generation,
        expires_at_ms,
    })
}

// ========================================
// Session Secret Management
// ========================================

/// Load the session signing secret, generating it on first use
///
/// Uses `INSERT OR IGNORE` followed by a re-read so two processes starting
/// at once agree on the same value.
pub async fn load_session_secret(db: &SqlitePool) -> Result<String> {
    if let Some(secret) = get_setting(db, SESSION_SECRET_KEY).await? {
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    insert_setting_if_absent(db, SESSION_SECRET_KEY, &to_hex(&bytes)).await?;

    get_setting(db, SESSION_SECRET_KEY)
        .await?
        .ok_or_else(|| crate::Error::Config("session secret could not be stored".to_string()))
}

// ========================================
// Tests
// ========================================
