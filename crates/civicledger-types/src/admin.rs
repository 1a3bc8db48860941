use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An administrator account able to review applications and read the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// An authenticated admin session, keyed by bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub admin_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
