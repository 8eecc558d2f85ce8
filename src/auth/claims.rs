use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which table the session principal lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Customer", alias = "user")]
    Customer,
    #[serde(alias = "Admin")]
    Admin,
}

/// JWT payload carried in session cookies and bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user or admin ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
    pub role: Role,
}
