//! Page redirects driven by the session cookies.

use axum::{
    extract::{FromRef, Query, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    auth::{
        session::{read_cookie, ADMIN_COOKIE, USER_COOKIE},
        JwtKeys, Role,
    },
    state::AppState,
};

const ADMIN_HOME: &str = "/admin-dashboard";
const ADMIN_LOGIN: &str = "/admin-login";
const CUSTOMER_HOME: &str = "/customer-menu";
const CUSTOMER_LOGIN: &str = "/login";

/// Which verified sessions the request carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sessions {
    pub admin: bool,
    pub user: bool,
}

impl Sessions {
    fn any(self) -> bool {
        self.admin || self.user
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

#[derive(Debug, Default, Deserialize)]
struct GuardParams {
    #[serde(rename = "redirectedFrom")]
    redirected_from: Option<String>,
}

/// Pages that need a session, including their static file names.
const PROTECTED_PREFIXES: [&str; 3] = [ADMIN_HOME, CUSTOMER_HOME, "/cart"];

/// Api calls, framework assets and files with an extension skip the guard.
/// Protected pages are guarded whatever their file name.
pub fn is_guarded(path: &str) -> bool {
    if path.starts_with("/api/") || path == "/api" || path.starts_with("/_next/") {
        return false;
    }
    if path == "/favicon.ico" {
        return false;
    }
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let last = path.rsplit('/').next().unwrap_or("");
    !last.contains('.')
}

fn with_redirect(target: &str, from: &str) -> String {
    format!("{target}?redirectedFrom={}", urlencoding::encode(from))
}

/// Same-site relative path that fits in a `Location` header, or the customer home.
fn safe_target(raw: &str) -> String {
    let raw = raw.trim();
    let relative = raw.starts_with('/') && !raw.starts_with("//") && !raw.contains('\\');
    let header_safe = !raw.chars().any(char::is_control) && HeaderValue::from_str(raw).is_ok();
    if relative && header_safe {
        raw.to_string()
    } else {
        CUSTOMER_HOME.to_string()
    }
}

/// First matching rule wins.
pub fn decide(path: &str, redirected_from: Option<&str>, sessions: Sessions) -> GuardDecision {
    let is_auth_page = path == "/login" || path == "/signup";

    if !sessions.admin && path.starts_with(ADMIN_HOME) {
        return GuardDecision::Redirect(with_redirect(ADMIN_LOGIN, path));
    }
    if sessions.admin && path == ADMIN_LOGIN {
        return GuardDecision::Redirect(ADMIN_HOME.to_string());
    }
    if !sessions.any() && (path.starts_with(CUSTOMER_HOME) || path.starts_with("/cart")) {
        return GuardDecision::Redirect(with_redirect(CUSTOMER_LOGIN, path));
    }
    if sessions.user && is_auth_page {
        return GuardDecision::Redirect(CUSTOMER_HOME.to_string());
    }
    if sessions.admin && is_auth_page {
        return GuardDecision::Redirect(ADMIN_HOME.to_string());
    }
    if sessions.any() {
        if let Some(from) = redirected_from {
            return GuardDecision::Redirect(safe_target(from));
        }
    }
    GuardDecision::Pass
}

/// A cookie counts only when it holds a valid token for its role.
pub fn sessions_from(headers: &HeaderMap, keys: &JwtKeys) -> Sessions {
    let valid = |name: &str, role: Role| {
        read_cookie(headers, name)
            .map(|token| keys.verify_role(token, role).is_ok())
            .unwrap_or(false)
    };
    Sessions {
        admin: valid(ADMIN_COOKIE, Role::Admin),
        user: valid(USER_COOKIE, Role::Customer),
    }
}

pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_guarded(&path) {
        return next.run(req).await;
    }

    let params = Query::<GuardParams>::try_from_uri(req.uri())
        .map(|Query(p)| p)
        .unwrap_or_default();
    let keys = JwtKeys::from_ref(&state);
    let sessions = sessions_from(req.headers(), &keys);

    match decide(&path, params.redirected_from.as_deref(), sessions) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Redirect(to) => {
            debug!(%path, %to, admin = sessions.admin, user = sessions.user, "guard redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}
