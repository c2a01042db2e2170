use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims of a practitioner session token. Tokens are issued by the web
/// app's auth layer; this service only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
