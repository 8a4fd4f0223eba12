use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::error::ConfigError;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_DURATION_SECONDS: i64 = 31_536_000;

/// `SameSite` attribute for the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Lax => write!(f, "Lax"),
            SameSite::Strict => write!(f, "Strict"),
            SameSite::None => write!(f, "None"),
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            other => Err(format!("expected lax, strict or none, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
    pub domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `*` means any
    pub allowed_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
}

/// Passwords used to seed the default accounts on an empty database
#[derive(Debug, Clone)]
pub struct DefaultPasswords {
    pub admin: String,
    pub mechanic: String,
    pub auditor: String,
}

impl DefaultPasswords {
    pub fn uses_builtin(&self) -> bool {
        self.admin == "admin123" || self.mechanic == "mechanic123" || self.auditor == "auditor123"
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_dir: PathBuf,
    pub db_file: String,
    pub port: u16,
    pub session_duration_seconds: i64,
    pub cookie: CookieConfig,
    pub cors: CorsConfig,
    /// Largest accepted request body, which bounds CSV uploads
    pub max_upload_bytes: usize,
    /// Per-IP rate limiting on the login endpoint
    pub login_rate_limit: bool,
    pub default_passwords: DefaultPasswords,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            db_dir: PathBuf::from(var("DB_DIR", "./data")),
            db_file: var("DB_FILE", "air_audit.sqlite"),
            port: parse("PORT", &var("PORT", "8000"))?,
            session_duration_seconds: parse_session_duration(&var(
                "SESSION_DURATION_SECONDS",
                "28800",
            ))?,
            cookie: CookieConfig {
                secure: parse_bool("COOKIE_SECURE", &var("COOKIE_SECURE", "false"))?,
                same_site: parse("COOKIE_SAMESITE", &var("COOKIE_SAMESITE", "lax"))?,
                domain: lookup("COOKIE_DOMAIN").filter(|d| !d.trim().is_empty()),
            },
            cors: CorsConfig {
                allowed_origins: split_list(&var("ALLOWED_ORIGINS", "*")),
                allow_methods: split_list(&var("CORS_ALLOW_METHODS", "*")),
                allow_headers: split_list(&var("CORS_ALLOW_HEADERS", "*")),
                allow_credentials: parse_bool(
                    "CORS_ALLOW_CREDENTIALS",
                    &var("CORS_ALLOW_CREDENTIALS", "true"),
                )?,
            },
            max_upload_bytes: parse("MAX_UPLOAD_BYTES", &var("MAX_UPLOAD_BYTES", "10485760"))?,
            login_rate_limit: parse_bool("LOGIN_RATE_LIMIT", &var("LOGIN_RATE_LIMIT", "true"))?,
            default_passwords: DefaultPasswords {
                admin: var("ADMIN_DEFAULT_PASSWORD", "admin123"),
                mechanic: var("MECHANIC_DEFAULT_PASSWORD", "mechanic123"),
                auditor: var("AUDITOR_DEFAULT_PASSWORD", "auditor123"),
            },
        })
    }

    /// Full path of the SQLite database file
    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(&self.db_file)
    }
}

impl CorsConfig {
    /// Build the CORS layer.
    ///
    /// Wildcards cannot be combined with credentials, so in that case the
    /// request's own origin, method and headers are mirrored back.
    pub fn layer(&self) -> Result<CorsLayer, ConfigError> {
        let wildcard = |values: &[String]| values.iter().any(|v| v == "*");
        let credentials = self.allow_credentials;

        let origin = if wildcard(&self.allowed_origins) {
            if credentials {
                AllowOrigin::mirror_request()
            } else {
                AllowOrigin::any()
            }
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|e| ConfigError::Invalid {
                        key: "ALLOWED_ORIGINS",
                        message: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        };

        let methods = if wildcard(&self.allow_methods) {
            if credentials {
                AllowMethods::mirror_request()
            } else {
                AllowMethods::any()
            }
        } else {
            let methods = self
                .allow_methods
                .iter()
                .map(|m| {
                    Method::from_bytes(m.to_uppercase().as_bytes()).map_err(|e| {
                        ConfigError::Invalid {
                            key: "CORS_ALLOW_METHODS",
                            message: e.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowMethods::list(methods)
        };

        let headers = if wildcard(&self.allow_headers) {
            if credentials {
                AllowHeaders::mirror_request()
            } else {
                AllowHeaders::any()
            }
        } else {
            let headers = self
                .allow_headers
                .iter()
                .map(|h| {
                    HeaderName::from_bytes(h.as_bytes()).map_err(|e| ConfigError::Invalid {
                        key: "CORS_ALLOW_HEADERS",
                        message: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowHeaders::list(headers)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(credentials))
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}

fn parse_session_duration(value: &str) -> Result<i64, ConfigError> {
    let seconds: i64 = parse("SESSION_DURATION_SECONDS", value)?;
    if !(1..=MAX_SESSION_DURATION_SECONDS).contains(&seconds) {
        return Err(ConfigError::Invalid {
            key: "SESSION_DURATION_SECONDS",
            message: format!(
                "expected 1..={} seconds, got {}",
                MAX_SESSION_DURATION_SECONDS, seconds
            ),
        });
    }
    Ok(seconds)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.db_path(), PathBuf::from("./data/air_audit.sqlite"));
        assert_eq!(config.port, 8000);
        assert_eq!(config.session_duration_seconds, 28800);
        assert!(!config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert!(config.cookie.domain.is_none());
        assert_eq!(config.cors.allowed_origins, vec!["*"]);
        assert!(config.cors.allow_credentials);
        assert!(config.login_rate_limit);
        assert!(config.default_passwords.uses_builtin());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DB_DIR", "/var/lib/audit"),
            ("DB_FILE", "ledger.db"),
            ("SESSION_DURATION_SECONDS", "60"),
            ("COOKIE_SECURE", "1"),
            ("COOKIE_SAMESITE", "Strict"),
            ("COOKIE_DOMAIN", "example.org"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("CORS_ALLOW_CREDENTIALS", "false"),
        ])
        .unwrap();

        assert_eq!(config.db_path(), PathBuf::from("/var/lib/audit/ledger.db"));
        assert_eq!(config.session_duration_seconds, 60);
        assert!(config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.cookie.domain.as_deref(), Some("example.org"));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.cors.allow_credentials);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("SESSION_DURATION_SECONDS", "soon")]).is_err());
        assert!(config_from(&[("COOKIE_SAMESITE", "sometimes")]).is_err());
        assert!(config_from(&[("COOKIE_SECURE", "maybe")]).is_err());
    }

    #[test]
    fn session_duration_must_be_in_range() {
        for bad in ["0", "-60", "100000000000000"] {
            let err = config_from(&[("SESSION_DURATION_SECONDS", bad)]).unwrap_err();
            assert!(
                err.to_string().contains("SESSION_DURATION_SECONDS"),
                "{bad}: {err}"
            );
        }

        let config = config_from(&[("SESSION_DURATION_SECONDS", "31536000")]).unwrap();
        assert_eq!(config.session_duration_seconds, MAX_SESSION_DURATION_SECONDS);
    }

    #[test]
    fn cors_layer_builds_for_wildcards_with_credentials() {
        let config = config_from(&[]).unwrap();
        assert!(config.cors.layer().is_ok());
    }

    #[test]
    fn cors_layer_rejects_bad_method() {
        let config = config_from(&[
            ("CORS_ALLOW_METHODS", "GET, NOT A METHOD"),
            ("CORS_ALLOW_CREDENTIALS", "false"),
        ])
        .unwrap();
        assert!(config.cors.layer().is_err());
    }
}
