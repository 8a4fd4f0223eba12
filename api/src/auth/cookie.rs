//! Session cookie handling

use axum::http::{header::COOKIE, HeaderMap};

use crate::config::CookieConfig;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// `Set-Cookie` value that stores a session token for `max_age_seconds`
pub fn session_cookie(config: &CookieConfig, token: &str, max_age_seconds: i64) -> String {
    build(config, token, max_age_seconds.max(0))
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(config: &CookieConfig) -> String {
    build(config, "", 0)
}

fn build(config: &CookieConfig, value: &str, max_age: i64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite={}",
        SESSION_COOKIE, value, max_age, config.same_site
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    if let Some(domain) = &config.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    cookie
}

/// Read a cookie from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::config::SameSite;

    fn config(secure: bool, domain: Option<&str>) -> CookieConfig {
        CookieConfig {
            secure,
            same_site: SameSite::Lax,
            domain: domain.map(String::from),
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(&config(false, None), "abc", 3600);
        assert_eq!(
            cookie,
            "session=abc; HttpOnly; Path=/; Max-Age=3600; SameSite=Lax"
        );

        let cookie = session_cookie(&config(true, Some("example.org")), "abc", 60);
        assert!(cookie.ends_with("; Secure; Domain=example.org"));
    }

    #[test]
    fn clearing_expires_immediately() {
        let cookie = clear_session_cookie(&config(false, None));
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=tok123"));

        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("tok123"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(read_cookie(&headers, "session"), None);
    }
}
