use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,

    pub auth_rate_limit_max: u32,
    pub auth_rate_limit_window_secs: u64,

    // Analytics windows
    pub trend_window_days: i64,
    pub forecast_window_days: i64,
    pub prediction_sample_size: i64,
    pub prediction_min_entries: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            // Comma-separated, e.g. LAN addresses used during development
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: required("JWT_SECRET")?,
            jwt_access_ttl_secs: parsed_or("JWT_ACCESS_TTL_SECS", 86_400)?,

            auth_rate_limit_max: parsed_or("AUTH_RATE_LIMIT_MAX", 5)?,
            auth_rate_limit_window_secs: parsed_or("AUTH_RATE_LIMIT_WINDOW_SECS", 60)?,

            trend_window_days: parsed_or("TREND_WINDOW_DAYS", 30)?,
            forecast_window_days: parsed_or("FORECAST_WINDOW_DAYS", 14)?,
            prediction_sample_size: parsed_or("PREDICTION_SAMPLE_SIZE", 14)?,
            prediction_min_entries: parsed_or("PREDICTION_MIN_ENTRIES", 7)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} must be set", key))
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a number, got {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
