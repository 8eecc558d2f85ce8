use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::{
    claims::Role,
    dto::JwtKeys,
    session::{cookie_name, read_cookie},
};
use crate::error::ApiError;

/// Authenticated customer ID, from the `user-session` cookie or a bearer token.
pub struct CurrentCustomer(pub Uuid);

/// Authenticated admin ID, from the `admin-session` cookie or a bearer token.
pub struct CurrentAdmin(pub Uuid);

fn session_token(headers: &HeaderMap, role: Role) -> Option<&str> {
    read_cookie(headers, cookie_name(role)).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
    })
}

pub(crate) fn authenticate(headers: &HeaderMap, keys: &JwtKeys, role: Role) -> Result<Uuid, ApiError> {
    let token = session_token(headers, role)
        .ok_or_else(|| ApiError::unauthorized("Please sign in to continue"))?;

    match keys.verify_role(token, role) {
        Ok(claims) => Ok(claims.sub),
        Err(e) => {
            warn!(error = %e, role = ?role, "rejected session token");
            Err(ApiError::unauthorized("Invalid or expired session"))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentCustomer
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(&parts.headers, &keys, Role::Customer).map(CurrentCustomer)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(&parts.headers, &keys, Role::Admin).map(CurrentAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn accepts_cookie_and_bearer() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let id = Uuid::new_v4();
        let token = keys.sign(id, Role::Customer).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("user-session={token}")).unwrap(),
        );
        assert_eq!(authenticate(&headers, &keys, Role::Customer).unwrap(), id);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(authenticate(&headers, &keys, Role::Customer).unwrap(), id);
    }

    #[tokio::test]
    async fn customer_token_is_not_an_admin_session() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let token = keys.sign(Uuid::new_v4(), Role::Customer).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let err = authenticate(&headers, &keys, Role::Admin).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let err = authenticate(&HeaderMap::new(), &keys, Role::Customer).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
