use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let raw =
            env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:4200".to_string());
        Self::parse(&raw)
    }

    /// Splits a comma-separated origin list, dropping blanks.
    pub fn parse(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}
