//! Administrator login and session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::administrateur;

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Administrator as exposed to the front-end (never includes the hash).
#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub nom: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<administrateur::Model> for AdminView {
    fn from(m: administrateur::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            nom: m.nom,
            last_login_at: m.last_login_at,
        }
    }
}

/// Current session: the administrator and the token to echo in `X-CSRF-Token`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub admin: AdminView,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}
