use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub admin_user: String,
    pub admin_password: String,
    pub session_secret: String,
    pub review_rate_per_min: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://kinoteka.db?mode=rwc".to_string());

        let admin_user = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        // Changing the secret invalidates every operator session.
        let session_secret = std::env::var("SESSION_SECRET")
            .unwrap_or_else(|_| "kinoteka-dev-secret".to_string());

        let review_rate_per_min: u32 =
            std::env::var("REVIEW_RATE_PER_MIN").ok().and_then(|s| s.parse().ok()).unwrap_or(6);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            admin_user,
            admin_password,
            session_secret,
            review_rate_per_min,
        })
    }

    /// Token expected in the operator session cookie.
    pub fn session_token(&self) -> String {
        let material =
            format!("{}:{}:{}", self.admin_user, self.admin_password, self.session_secret);
        blake3::hash(material.as_bytes()).to_hex().to_string()
    }
}
