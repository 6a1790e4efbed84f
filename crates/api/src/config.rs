use fanfare_core::config::NominationRules;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Nomination batch limits.
    pub nomination_rules: NominationRules,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `MAX_FIC_NOMINATIONS`    | `3`                     |
    /// | `MAX_PERSON_NOMINATIONS` | `5`                     |
    /// | `MIN_DISTINCT_PEOPLE`    | `4`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let defaults = NominationRules::default();
        let nomination_rules = NominationRules {
            max_fic_nominations: env_u32("MAX_FIC_NOMINATIONS", defaults.max_fic_nominations),
            max_person_nominations: env_u32(
                "MAX_PERSON_NOMINATIONS",
                defaults.max_person_nominations,
            ),
            min_distinct_people: env_u32("MIN_DISTINCT_PEOPLE", defaults.min_distinct_people),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            nomination_rules,
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid u32")),
        Err(_) => default,
    }
}
