use std::net::SocketAddr;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use tracing::{info, warn};

use beacon_db::Database;
use beacon_types::api::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use beacon_types::models::{LoginAttempt, ROLE_ADMIN, ROLE_USER};

use crate::AppState;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::validation::contains_sql_injection;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }
    if username.chars().count() < 3 {
        return Err(ApiError::BadRequest(
            "username must be at least 3 characters".into(),
        ));
    }
    if password.chars().count() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }

    // Admin accounts are never created through signup.
    let requested = req.role.unwrap_or_else(|| ROLE_USER.to_string());
    let role = if requested == ROLE_ADMIN {
        ROLE_USER.to_string()
    } else {
        requested
    };

    if state.db.get_user_by_username(&username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&password)?;
    state.db.create_user(&username, &password_hash, &role)?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully".into(),
            username,
            role,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let role = req.role.unwrap_or_default();

    if username.is_empty() || password.is_empty() || role.is_empty() {
        return Err(ApiError::BadRequest(
            "username, password, and role are required".into(),
        ));
    }

    let ip_address = addr.ip().to_string();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // Suspected injection gets the same answer as a wrong password, so a
    // probe cannot tell it was detected. The attempt is still audited.
    if contains_sql_injection(&username)
        || contains_sql_injection(&password)
        || contains_sql_injection(&role)
    {
        state
            .db
            .insert_login_attempt(&username, &role, false, &ip_address, &user_agent)?;
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let outcome = match state.db.get_user_by_username(&username)? {
        Some(user) => {
            if verify_password(&password, &user.password_hash)? {
                if user.role == role {
                    Ok(user.role)
                } else {
                    Err(format!(
                        "Invalid role. This account is registered as {}",
                        user.role
                    ))
                }
            } else {
                Err("Invalid password".to_string())
            }
        }
        None => Err("User not found. Please sign up first.".to_string()),
    };

    state.db.insert_login_attempt(
        &username,
        &role,
        outcome.is_ok(),
        &ip_address,
        &user_agent,
    )?;

    match outcome {
        Ok(user_role) => Ok(Json(LoginResponse {
            success: true,
            message: "Login successful".into(),
            role: user_role,
            username,
        })),
        Err(message) => Err(ApiError::Unauthorized(message)),
    }
}

/// Most recent attempts, newest first.
pub async fn login_attempts(
    State(state): State<AppState>,
) -> Result<Json<Vec<LoginAttempt>>, ApiError> {
    let rows = state.db.recent_login_attempts(100)?;
    Ok(Json(rows))
}

/// Creates the bootstrap admin account on first run. Replaces the hardcoded
/// credential fallback that would otherwise live inside the login path.
pub fn seed_default_admin(db: &Database, username: &str, password: &str) -> anyhow::Result<()> {
    if db.get_user_by_username(username)?.is_some() {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|_| anyhow::anyhow!("failed to hash admin password"))?;
    db.create_user(username, &password_hash, ROLE_ADMIN)?;

    info!("Seeded default admin account '{}'", username);
    if password == "admin123" {
        warn!("Default admin password in use; set BEACON_ADMIN_PASSWORD");
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| anyhow::anyhow!("bad stored hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppStateInner;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn test_state() -> AppState {
        let path = std::env::temp_dir().join(format!(
            "beacon-auth-test-{}-{}.db",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&path);
        let db = Database::open(&path, 2).unwrap();
        Arc::new(AppStateInner { db })
    }

    fn signup_req(username: &str, password: &str, role: Option<&str>) -> SignupRequest {
        SignupRequest {
            username: Some(username.into()),
            password: Some(password.into()),
            role: role.map(Into::into),
        }
    }

    fn login_req(username: &str, password: &str, role: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.into()),
            password: Some(password.into()),
            role: Some(role.into()),
        }
    }

    async fn do_login(state: &AppState, req: LoginRequest) -> Result<Json<LoginResponse>, ApiError> {
        login(
            State(state.clone()),
            ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))),
            HeaderMap::new(),
            ApiJson(req),
        )
        .await
    }

    #[tokio::test]
    async fn signup_rejects_short_username_then_short_password() {
        let state = test_state();

        let err = signup(State(state.clone()), ApiJson(signup_req("ab", "abcdef", None)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::BadRequest(m) if m.contains("at least 3")));

        let err = signup(State(state.clone()), ApiJson(signup_req("abc", "12345", None)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::BadRequest(m) if m.contains("at least 6")));

        assert!(
            signup(State(state), ApiJson(signup_req("abc", "abcdef", None)))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn signup_missing_fields_is_400() {
        let state = test_state();
        let req = SignupRequest {
            username: Some("maria".into()),
            password: None,
            role: None,
        };
        let err = signup(State(state), ApiJson(req)).await.err().unwrap();
        assert!(matches!(err, ApiError::BadRequest(m) if m == "username and password are required"));
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let state = test_state();
        assert!(
            signup(
                State(state.clone()),
                ApiJson(signup_req("maria", "secret1", None))
            )
            .await
            .is_ok()
        );
        let err = signup(State(state), ApiJson(signup_req("maria", "other77", None)))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Conflict(m) if m == "Username already exists"));
    }

    #[tokio::test]
    async fn signup_demotes_admin_role() {
        let state = test_state();
        signup(
            State(state.clone()),
            ApiJson(signup_req("maria", "secret1", Some("Admin"))),
        )
        .await
        .unwrap();

        let user = state.db.get_user_by_username("maria").unwrap().unwrap();
        assert_eq!(user.role, "User");
    }

    #[tokio::test]
    async fn login_happy_path_and_password_mismatch() {
        let state = test_state();
        signup(
            State(state.clone()),
            ApiJson(signup_req("maria", "secret1", None)),
        )
        .await
        .unwrap();

        let resp = do_login(&state, login_req("maria", "secret1", "User"))
            .await
            .unwrap();
        assert!(resp.0.success);
        assert_eq!(resp.0.role, "User");
        assert_eq!(resp.0.username, "maria");

        let err = do_login(&state, login_req("maria", "wrongpw", "User"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unauthorized(m) if m == "Invalid password"));

        // One row per call, newest first
        let attempts = state.db.recent_login_attempts(100).unwrap();
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].success);
        assert!(attempts[1].success);
    }

    #[tokio::test]
    async fn login_role_mismatch_names_actual_role() {
        let state = test_state();
        signup(
            State(state.clone()),
            ApiJson(signup_req("maria", "secret1", None)),
        )
        .await
        .unwrap();

        let err = do_login(&state, login_req("maria", "secret1", "Admin"))
            .await
            .err()
            .unwrap();
        assert!(
            matches!(err, ApiError::Unauthorized(m) if m == "Invalid role. This account is registered as User")
        );
    }

    #[tokio::test]
    async fn login_unknown_user_prompts_signup() {
        let state = test_state();
        let err = do_login(&state, login_req("ghost", "secret1", "User"))
            .await
            .err()
            .unwrap();
        assert!(
            matches!(err, ApiError::Unauthorized(m) if m == "User not found. Please sign up first.")
        );
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let state = test_state();
        seed_default_admin(&state.db, "admin", "admin123").unwrap();
        // Second seed is a no-op
        seed_default_admin(&state.db, "admin", "admin123").unwrap();

        let resp = do_login(&state, login_req("admin", "admin123", "Admin"))
            .await
            .unwrap();
        assert!(resp.0.success);
        assert_eq!(resp.0.role, "Admin");
    }

    #[tokio::test]
    async fn injection_probe_gets_generic_401_and_is_audited() {
        let state = test_state();
        let err = do_login(&state, login_req("admin' OR '1'='1", "x", "User"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unauthorized(m) if m == "Invalid credentials"));

        let attempts = state.db.recent_login_attempts(100).unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(!attempts[0].success);
        assert_eq!(attempts[0].username, "admin' OR '1'='1");
    }

    #[tokio::test]
    async fn login_missing_role_is_400() {
        let state = test_state();
        let req = LoginRequest {
            username: Some("maria".into()),
            password: Some("secret1".into()),
            role: None,
        };
        let err = do_login(&state, req).await.err().unwrap();
        assert!(
            matches!(err, ApiError::BadRequest(m) if m == "username, password, and role are required")
        );
    }
}
