use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub upload_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let session = SessionConfig {
            secret: std::env::var("SECRET_KEY")
                .unwrap_or_else(|_| "default_secret_key_for_dev".into()),
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "batch-records".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 12),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };
        let upload_dir = std::env::var("UPLOAD_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        Ok(Self {
            database_url: normalize_database_url(&database_url),
            session,
            upload_dir,
        })
    }
}

/// Managed hosts hand out `postgres://` URLs; rewrite the scheme to the
/// `postgresql://` spelling. Only the leading prefix is touched.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{}", rest),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_short_postgres_scheme() {
        assert_eq!(
            normalize_database_url("postgres://u:p@db.example.com:5432/app"),
            "postgresql://u:p@db.example.com:5432/app"
        );
    }

    #[test]
    fn leaves_other_urls_alone() {
        assert_eq!(
            normalize_database_url("postgresql://u:p@localhost/app"),
            "postgresql://u:p@localhost/app"
        );
        assert_eq!(normalize_database_url("sqlite://app.db"), "sqlite://app.db");
    }

    #[test]
    fn rewrites_prefix_only_once() {
        assert_eq!(
            normalize_database_url("postgres://host/postgres://x"),
            "postgresql://host/postgres://x"
        );
    }
}
