use axum::http::{header, HeaderMap, HeaderValue};

use super::claims::Role;

pub const ADMIN_COOKIE: &str = "admin-session";
pub const USER_COOKIE: &str = "user-session";

pub fn cookie_name(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_COOKIE,
        Role::Customer => USER_COOKIE,
    }
}

/// Value of the named cookie from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(
    role: Role,
    token: &str,
    max_age_secs: u64,
    secure: bool,
) -> anyhow::Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        cookie_name(role),
        token,
        max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

pub fn clear_cookie(role: Role) -> HeaderValue {
    HeaderValue::from_static(match role {
        Role::Admin => {
            "admin-session=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax"
        }
        Role::Customer => {
            "user-session=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; user-session=abc.def.ghi; admin-session="),
        );
        assert_eq!(read_cookie(&headers, USER_COOKIE), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, ADMIN_COOKIE), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_cookie_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("admin-session=tok"));
        assert_eq!(read_cookie(&headers, ADMIN_COOKIE), Some("tok"));
    }

    #[test]
    fn session_cookie_attributes() {
        let v = session_cookie(Role::Admin, "tok", 604800, true).unwrap();
        let s = v.to_str().unwrap();
        assert!(s.starts_with("admin-session=tok; Path=/; Max-Age=604800"));
        assert!(s.contains("HttpOnly"));
        assert!(s.ends_with("; Secure"));

        let v = session_cookie(Role::Customer, "tok", 60, false).unwrap();
        assert!(!v.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let s = clear_cookie(Role::Customer);
        let s = s.to_str().unwrap();
        assert!(s.starts_with("user-session=;"));
        assert!(s.contains("Max-Age=0"));
        assert!(s.contains("1970"));
    }
}
