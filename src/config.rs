use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

/// Ten years; longer lifetimes overflow cookie and expiry arithmetic.
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Session lifetime kept within `1..=MAX_SESSION_TTL_DAYS`.
pub fn clamp_ttl_days(days: i64) -> i64 {
    days.clamp(1, MAX_SESSION_TTL_DAYS)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub media_root: PathBuf,
    pub session_ttl_days: i64,
    pub login_attempts_per_minute: u32,
    pub secure_cookies: bool,
    /// Lowercased; accounts with these emails are staff.
    pub staff_emails: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT").unwrap_or_else(|| "3000".to_string()).parse().context("PORT")?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://cinedex.db?mode=rwc".to_string());

        let media_root = PathBuf::from(var("MEDIA_ROOT").unwrap_or_else(|| "media".to_string()));

        let session_ttl_days = clamp_ttl_days(
            var("SESSION_TTL_DAYS").and_then(|s| s.trim().parse().ok()).unwrap_or(14),
        );

        let login_attempts_per_minute: u32 =
            var("LOGIN_ATTEMPTS_PER_MINUTE").and_then(|s| s.parse().ok()).unwrap_or(10);

        let secure_cookies = var("SECURE_COOKIES")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let staff_emails = var("STAFF_EMAILS")
            .map(|s| {
                s.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            media_root,
            session_ttl_days,
            login_attempts_per_minute,
            secure_cookies,
            staff_emails,
        })
    }

    pub fn is_staff_email(&self, email: &str) -> bool {
        self.staff_emails.iter().any(|e| e.eq_ignore_ascii_case(email))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.database_url, "sqlite://cinedex.db?mode=rwc");
        assert_eq!(config.session_ttl_days, 14);
        assert_eq!(config.login_attempts_per_minute, 10);
        assert!(!config.secure_cookies);
        assert!(config.staff_emails.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SECURE_COOKIES", "true"),
            ("STAFF_EMAILS", "Admin@Example.com, ,editor@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert!(config.secure_cookies);
        assert_eq!(config.staff_emails, ["admin@example.com", "editor@example.com"]);
        assert!(config.is_staff_email("ADMIN@example.com"));
    }

    #[test]
    fn session_ttl_is_clamped() {
        let huge = Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "9223372036854775807")]))
            .unwrap();
        assert_eq!(huge.session_ttl_days, MAX_SESSION_TTL_DAYS);

        let negative = Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "-5")])).unwrap();
        assert_eq!(negative.session_ttl_days, 1);

        let garbage = Config::from_lookup(lookup(&[("SESSION_TTL_DAYS", "forever")])).unwrap();
        assert_eq!(garbage.session_ttl_days, 14);
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
    }
}
