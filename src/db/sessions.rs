//! Database operations for administrator sessions.
//!
//! Only the SHA-256 hash of the session token is stored.

use chrono::Utc;
use sea_orm::*;
use sha2::{Digest, Sha256};

use crate::entity::admin_session;
use crate::error::AppResult;

/// Hash a session token using SHA-256.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random session token string.
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("loc_s_{}", hex::encode(random_bytes))
}

/// Generate a per-session CSRF token.
pub fn generate_csrf_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Insert a new session (stores the hash, not the raw token).
pub async fn insert(
    db: &DatabaseConnection,
    admin_id: i32,
    token_hash: &str,
    csrf_token: &str,
    ip_address: Option<&str>,
    ttl_secs: u64,
) -> AppResult<admin_session::Model> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_secs as i64);

    let model = admin_session::ActiveModel {
        admin_id: Set(admin_id),
        token_hash: Set(token_hash.to_string()),
        csrf_token: Set(csrf_token.to_string()),
        ip_address: Set(ip_address.map(str::to_string)),
        expires_at: Set(expires_at),
        revoked_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Find an active (non-revoked, non-expired) session by its hash.
pub async fn find_valid_by_hash(
    db: &DatabaseConnection,
    token_hash: &str,
) -> AppResult<Option<admin_session::Model>> {
    let result = admin_session::Entity::find()
        .filter(admin_session::Column::TokenHash.eq(token_hash))
        .filter(admin_session::Column::RevokedAt.is_null())
        .filter(admin_session::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?;

    Ok(result)
}

/// Revoke a session by its hash.
pub async fn revoke_by_hash(db: &DatabaseConnection, token_hash: &str) -> AppResult<bool> {
    let result = admin_session::Entity::find()
        .filter(admin_session::Column::TokenHash.eq(token_hash))
        .filter(admin_session::Column::RevokedAt.is_null())
        .one(db)
        .await?;

    if let Some(m) = result {
        let mut active: admin_session::ActiveModel = m.into();
        active.revoked_at = Set(Some(Utc::now()));
        active.update(db).await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Revoke every open session of an administrator.
pub async fn revoke_all_for_admin(db: &DatabaseConnection, admin_id: i32) -> AppResult<u64> {
    let result = admin_session::Entity::update_many()
        .filter(admin_session::Column::AdminId.eq(admin_id))
        .filter(admin_session::Column::RevokedAt.is_null())
        .col_expr(
            admin_session::Column::RevokedAt,
            sea_orm::prelude::Expr::value(Some(Utc::now())),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete expired and revoked sessions (run from the reminder cron).
pub async fn purge_expired(db: &DatabaseConnection) -> AppResult<u64> {
    let now = Utc::now();
    let result = admin_session::Entity::delete_many()
        .filter(
            Condition::any()
                .add(admin_session::Column::ExpiresAt.lt(now))
                .add(admin_session::Column::RevokedAt.is_not_null()),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("loc_s_abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("loc_s_abc"));
        assert_ne!(hash, hash_token("loc_s_abd"));
    }

    #[test]
    fn test_generated_tokens_differ() {
        let a = generate_token();
        let b = generate_token();
        assert!(a.starts_with("loc_s_"));
        assert_ne!(a, b);
        assert_eq!(generate_csrf_token().len(), 64);
    }
}
