// config.rs
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub log_level: LevelFilter,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,
    // Job lifecycle policy
    pub cancel_lead_hours: i64,
    // Pricing policy
    pub price_default_rate: i64,
    pub pricing_strict: bool,
    // Bootstrap admin account
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let port = env_or("PORT", 8000);
        let db_max_connections = env_or("DB_MAX_CONNECTIONS", 20);
        let cancel_lead_hours = env_or("CANCEL_LEAD_HOURS", 12);
        let price_default_rate = env_or("PRICE_DEFAULT_RATE", 100_000);
        let pricing_strict = env_or("PRICING_STRICT", false);

        let log_level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| level.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::DEBUG);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let admin_email = std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().expect("JWT_MAXAGE must be a number of minutes"),
            port,
            log_level,
            db_max_connections,
            cors_origins,
            cancel_lead_hours,
            price_default_rate,
            pricing_strict,
            admin_email,
            admin_password,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Config {
        Config {
            database_url: "postgres://localhost/tidyhome_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 0,
            log_level: LevelFilter::OFF,
            db_max_connections: 1,
            cors_origins: vec![],
            cancel_lead_hours: 12,
            price_default_rate: 100_000,
            pricing_strict: false,
            admin_email: None,
            admin_password: None,
        }
    }
}
