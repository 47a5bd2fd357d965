//! Admin accounts

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{generate_salt, hash_password, verify_password};
use crate::config::AdminBootstrap;
use crate::db::models::Admin;
use crate::{Error, Result};

/// Create an admin with a freshly salted password hash, returning its id
pub async fn create_admin(db: &SqlitePool, username: &str, password: &str) -> Result<i64> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty".to_string()));
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let result = sqlx::query(
        "INSERT INTO admins (username, password_hash, password_salt) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(&hash)
    .bind(&salt)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_admin(db: &SqlitePool, id: i64) -> Result<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password_hash, password_salt, session_generation FROM admins WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(admin)
}

/// Invalidate every outstanding session token for `admin_id`
///
/// Returns `false` when the admin does not exist.
pub async fn revoke_sessions(db: &SqlitePool, admin_id: i64) -> Result<bool> {
    let result =
        sqlx::query("UPDATE admins SET session_generation = session_generation + 1 WHERE id = ?")
            .bind(admin_id)
            .execute(db)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_admins(db: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Check a username/password pair
///
/// Returns the admin on success. An unknown username still pays for one
/// hash computation so both failure cases take similar time.
pub async fn verify_admin(db: &SqlitePool, username: &str, password: &str) -> Result<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password_hash, password_salt, session_generation FROM admins WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db)
    .await?;

    match admin {
        Some(admin) if verify_password(password, &admin.password_salt, &admin.password_hash) => {
            Ok(Some(admin))
        }
        Some(_) => Ok(None),
        None => {
            let _ = hash_password(password, "");
            Ok(None)
        }
    }
}

/// Create the first admin from bootstrap configuration
///
/// Only acts when the `admins` table is empty and both username and
/// password are configured. Returns `true` when an admin was created.
pub async fn ensure_bootstrap_admin(db: &SqlitePool, bootstrap: &AdminBootstrap) -> Result<bool> {
    if count_admins(db).await? > 0 {
        return Ok(false);
    }

    match (&bootstrap.username, &bootstrap.password) {
        (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
            create_admin(db, username, password).await?;
            info!("Created initial admin account '{}'", username.trim());
            Ok(true)
        }
        _ => {
            warn!("No admin accounts exist and no bootstrap credential is configured; admin area is unreachable");
            Ok(false)
        }
    }
}
