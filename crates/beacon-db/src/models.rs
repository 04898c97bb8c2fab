/// Account row. Stays inside the gateway — the password hash never crosses
/// into a serializable API type.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}
