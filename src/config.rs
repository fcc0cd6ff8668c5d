use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(21670),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:boardsync.db".into()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-only-secret".into()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21670,
            database_url: "sqlite:boardsync.db".into(),
            jwt_secret: "dev-only-secret".into(),
            cors_origin: "http://localhost:3000,http://127.0.0.1:3000".into(),
        }
    }
}
