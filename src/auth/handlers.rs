use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AdminSignupRequest, LoginRequest, PublicAdmin, PublicUser, SessionResponse,
            SignupRequest,
        },
        extractors::{CurrentAdmin, CurrentCustomer},
        password::{hash_password, verify_password},
        repo_types::{Admin, User},
        services::{is_valid_email, normalize_email, JwtKeys, Role},
        session::{clear_cookie, session_cookie},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/me", get(get_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/auth/signup", post(admin_signup))
        .route("/admin/auth/login", post(admin_login))
        .route("/admin/auth/logout", post(admin_logout))
        .route("/admin/me", get(get_admin_me))
}

fn validate_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Please enter both email and password"));
    }
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }
    Ok(())
}

fn validate_new_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::bad_request("Password too short"));
    }
    Ok(())
}

/// Signs a session token and builds the `Set-Cookie` header carrying it.
fn start_session(state: &AppState, id: Uuid, role: Role) -> ApiResult<(HeaderMap, String, u64)> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(id, role).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;
    let max_age = keys.ttl.as_secs();
    let cookie = session_cookie(role, &token, max_age, state.config.session.cookie_secure)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);
    Ok((headers, token, max_age))
}

fn end_session(role: Role) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, clear_cookie(role));
    (StatusCode::NO_CONTENT, headers)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<SessionResponse<PublicUser>>)> {
    payload.email = normalize_email(&payload.email);
    let full_name = payload.full_name.trim().to_string();

    if full_name.is_empty() {
        return Err(ApiError::bad_request("Full name is required"));
    }
    validate_credentials(&payload.email, &payload.password)?;
    validate_new_password(&payload.password)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &full_name, &payload.email, &hash)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::conflict("Email already registered"),
            other => other,
        })?;

    let (headers, token, expires_in) = start_session(&state, user.id, Role::Customer)?;
    info!(user_id = %user.id, email = %user.email, "customer registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(SessionResponse {
            token,
            expires_in,
            profile: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<SessionResponse<PublicUser>>)> {
    payload.email = normalize_email(&payload.email);
    validate_credentials(&payload.email, &payload.password)?;

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let (headers, token, expires_in) = start_session(&state, user.id, Role::Customer)?;
    info!(user_id = %user.id, email = %user.email, "customer logged in");
    Ok((
        headers,
        Json(SessionResponse {
            token,
            expires_in,
            profile: user.into(),
        }),
    ))
}

pub async fn logout() -> (StatusCode, HeaderMap) {
    end_session(Role::Customer)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentCustomer(user_id): CurrentCustomer,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        error!(user_id = %user_id, "user not found");
        ApiError::unauthorized("User not found")
    })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn admin_signup(
    State(state): State<AppState>,
    Json(mut payload): Json<AdminSignupRequest>,
) -> ApiResult<(StatusCode, Json<PublicAdmin>)> {
    payload.email = normalize_email(&payload.email);
    validate_credentials(&payload.email, &payload.password)?;
    validate_new_password(&payload.password)?;

    if Admin::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "admin email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let full_name = payload
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let hash = hash_password(&payload.password)?;
    let admin = Admin::create(&state.db, &payload.email, full_name, &hash)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::conflict("Email already registered"),
            other => other,
        })?;

    // admins sign in explicitly after creating the account
    info!(admin_id = %admin.id, email = %admin.email, "admin registered");
    Ok((StatusCode::CREATED, Json(admin.into())))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<SessionResponse<PublicAdmin>>)> {
    payload.email = normalize_email(&payload.email);
    validate_credentials(&payload.email, &payload.password)?;

    let Some(admin) = Admin::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "admin login unknown email");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &admin.password_hash)? {
        warn!(email = %payload.email, admin_id = %admin.id, "admin login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let (headers, token, expires_in) = start_session(&state, admin.id, Role::Admin)?;
    info!(admin_id = %admin.id, email = %admin.email, "admin logged in");
    Ok((
        headers,
        Json(SessionResponse {
            token,
            expires_in,
            profile: admin.into(),
        }),
    ))
}

pub async fn admin_logout() -> (StatusCode, HeaderMap) {
    end_session(Role::Admin)
}

#[instrument(skip(state))]
pub async fn get_admin_me(
    State(state): State<AppState>,
    CurrentAdmin(admin_id): CurrentAdmin,
) -> ApiResult<Json<PublicAdmin>> {
    let admin = Admin::find_by_id(&state.db, admin_id).await?.ok_or_else(|| {
        error!(admin_id = %admin_id, "admin not found");
        ApiError::unauthorized("Admin not found")
    })?;
    Ok(Json(admin.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        let err = validate_credentials("", "secret").unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password");
        let err = validate_credentials("a@b.co", "").unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password");
        assert!(validate_credentials("a@b.co", "x").is_ok());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_new_password("1234567").is_err());
        assert!(validate_new_password("12345678").is_ok());
    }

    #[tokio::test]
    async fn start_session_sets_cookie() {
        let state = AppState::fake();
        let id = Uuid::new_v4();
        let (headers, token, max_age) = start_session(&state, id, Role::Admin).unwrap();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("admin-session={token};")));
        assert!(cookie.contains(&format!("Max-Age={max_age}")));
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let (status, headers) = logout().await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("user-session=;"));
    }
}
