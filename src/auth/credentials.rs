use rusqlite::{params, OptionalExtension};

use crate::auth::password::{hash_password, verify_password};
use crate::db::models::Account;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Create an account with a freshly salted hash of the password.
/// Username uniqueness is enforced by the users table constraint.
pub fn register(pool: &DbPool, username: &str, raw_password: &str) -> AppResult<Account> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    let password_hash = hash_password(raw_password)?;

    conn.execute(
        "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
        params![id, username, password_hash],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::DuplicateUsername
        }
        other => AppError::Database(other),
    })?;

    conn.query_row(
        "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
        params![id],
        map_account,
    )
    .map_err(AppError::Database)
}

/// Look up an account by username and check the password against the stored
/// hash. The lookup result is checked before any hash comparison.
pub fn verify(pool: &DbPool, username: &str, raw_password: &str) -> AppResult<Account> {
    let conn = pool.get()?;

    let account = conn
        .query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
            params![username],
            map_account,
        )
        .optional()?
        .ok_or(AppError::NotFound)?;

    if !verify_password(raw_password, &account.password_hash) {
        return Err(AppError::BadCredentials);
    }

    Ok(account)
}

fn map_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}
