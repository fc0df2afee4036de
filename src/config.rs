use std::env;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
/// One year. Longer lifetimes are rejected and fall back to the default.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    /// Seed credentials for the first admin account; both must be set.
    pub admin: Option<AdminSeed>,
}

#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let session_ttl_hours = parse_session_ttl(env::var("SESSION_TTL_HOURS").ok());

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(AdminSeed {
                    email: email.trim().to_lowercase(),
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
            admin,
        })
    }
}

fn parse_session_ttl(raw: Option<String>) -> i64 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(h) if (1..=MAX_SESSION_TTL_HOURS).contains(&h) => h,
        Some(h) => {
            tracing::warn!(
                "SESSION_TTL_HOURS={h} outside 1..={MAX_SESSION_TTL_HOURS}, using {DEFAULT_SESSION_TTL_HOURS}"
            );
            DEFAULT_SESSION_TTL_HOURS
        }
        None => DEFAULT_SESSION_TTL_HOURS,
    }
}
