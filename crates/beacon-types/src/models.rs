use serde::{Deserialize, Serialize};

/// Account roles. Requests carry the role as a free string so that a
/// malformed value can still be injection-checked and audit-logged before
/// it is compared against these.
pub const ROLE_USER: &str = "User";
pub const ROLE_ADMIN: &str = "Admin";

/// A submitted SOS report as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One append-only audit row per login call. The password is never recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}
