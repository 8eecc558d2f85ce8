use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{PublicAdmin, PublicUser};

/// Customer record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
}

/// Admin record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl Admin {
    /// `full_name` when set, otherwise the local part of the email.
    pub fn display_name(&self) -> String {
        admin_display_name(self.full_name.as_deref(), &self.email)
    }
}

pub fn admin_display_name(full_name: Option<&str>, email: &str) -> String {
    match full_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

impl From<Admin> for PublicAdmin {
    fn from(a: Admin) -> Self {
        let display_name = a.display_name();
        Self {
            id: a.id,
            email: a.email,
            display_name,
            created_at: a.created_at,
        }
    }
}
