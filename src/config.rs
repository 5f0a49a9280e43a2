use std::env;

/// Switches for the behaviours the marketplace has historically left open.
///
/// Defaults reproduce the legacy behaviour; flipping a flag tightens it.
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    /// Use the total the client submits instead of recomputing it from catalog prices.
    pub trust_client_total: bool,
    /// Reject ratings on orders that are not completed yet.
    pub rate_only_completed: bool,
    /// Allow more than one accepted offer per task.
    pub allow_sibling_accepts: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            trust_client_total: true,
            rate_only_completed: false,
            allow_sibling_accepts: true,
        }
    }
}

impl LifecyclePolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trust_client_total: parse_bool("TRUST_CLIENT_TOTAL", defaults.trust_client_total),
            rate_only_completed: parse_bool("RATE_ONLY_COMPLETED", defaults.rate_only_completed),
            allow_sibling_accepts: parse_bool(
                "ALLOW_SIBLING_ACCEPTS",
                defaults.allow_sibling_accepts,
            ),
        }
    }
}

/// Server configuration, read once at startup (after `dotenv`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub access_token_secret: String,
    pub port: u16,
    pub run_migrations: bool,
    pub policy: LifecyclePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = required("DATABASE_URL")?;
        let access_token_secret = required("ACCESS_TOKEN_SECRET")?;
        let port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|e| format!("PORT must be a valid port number: {e}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url,
            access_token_secret,
            port,
            run_migrations: parse_bool("RUN_MIGRATIONS", false),
            policy: LifecyclePolicy::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn required(env_var: &str) -> Result<String, String> {
    env::var(env_var).map_err(|_| format!("{env_var} must be set"))
}

fn parse_bool(env_var: &str, default: bool) -> bool {
    env::var(env_var)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
