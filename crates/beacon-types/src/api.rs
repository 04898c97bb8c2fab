use serde::{Deserialize, Serialize};

// -- Auth --

/// Fields are optional so that a missing field reports a field-level 400
/// instead of a generic JSON deserialization failure.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub role: String,
    pub username: String,
}

// -- Data entries --

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: Option<String>,
    pub message: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}
