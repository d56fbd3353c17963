use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::services::export::MAX_EXPORT_BYTES;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub frontend_url: String,
    pub public_base_url: String,
    pub storage_dir: String,
    pub share_rate_limit_max: u32,
    pub share_rate_limit_window_secs: u64,
    pub export_pixel_ratio: f32,
    pub export_max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let port: u16 = parse_var("PORT", 8080)?;
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let public_base_url = super::validators::validate_base_url(&public_base_url)
            .context("PUBLIC_BASE_URL is not a valid http(s) URL")?;

        let export_pixel_ratio: f32 = parse_var("EXPORT_PIXEL_RATIO", 2.0)?;
        if !(0.5..=8.0).contains(&export_pixel_ratio) {
            anyhow::bail!("EXPORT_PIXEL_RATIO must be between 0.5 and 8");
        }

        Ok(Config {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            host,
            port,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|a| !a.is_empty()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            public_base_url,
            storage_dir: env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()),
            share_rate_limit_max: parse_var("SHARE_RATE_LIMIT_MAX", 10)?,
            share_rate_limit_window_secs: parse_var("SHARE_RATE_LIMIT_WINDOW_SECS", 86_400)?,
            export_pixel_ratio,
            export_max_bytes: parse_var("EXPORT_MAX_BYTES", MAX_EXPORT_BYTES)?,
        })
    }
}

/// Read an optional variable, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
