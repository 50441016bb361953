use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    /// Marks the session cookie `Secure`; set when `APP_ENV=production`.
    pub secure_cookies: bool,
    /// Offset used for calendar boundaries (today / month / year).
    pub shop_offset: UtcOffset,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        // Token signing cannot work without a secret, so refuse to start.
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "laundrypro".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "laundrypro-users".into()),
            ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", 24)?,
        };
        anyhow::ensure!(jwt.ttl_hours > 0, "SESSION_TTL_HOURS must be positive");

        let offset_hours: i8 = parse_or(&lookup, "SHOP_UTC_OFFSET_HOURS", 0)?;
        let shop_offset = UtcOffset::from_hms(offset_hours, 0, 0)
            .context("SHOP_UTC_OFFSET_HOURS out of range")?;

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt,
            secure_cookies: lookup("APP_ENV").as_deref() == Some("production"),
            shop_offset,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/laundry"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config");
        assert_eq!(cfg.jwt.ttl_hours, 24);
        assert_eq!(cfg.jwt.issuer, "laundrypro");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.shop_offset, UtcOffset::UTC);
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/laundry",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let blank = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/laundry"),
            ("JWT_SECRET", "   "),
        ]));
        assert!(blank.is_err());
    }

    #[test]
    fn production_env_secures_cookie_and_reads_offset() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/laundry"),
            ("JWT_SECRET", "s3cret"),
            ("APP_ENV", "production"),
            ("SHOP_UTC_OFFSET_HOURS", "7"),
        ]))
        .expect("config");
        assert!(cfg.secure_cookies);
        assert_eq!(cfg.shop_offset.whole_hours(), 7);
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/laundry"),
            ("JWT_SECRET", "s3cret"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
