use crate::app_config::{AppConfig, Environment, DEFAULT_USER_AGENTS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the defaults reproduce a polite single-user
/// scraper (15 s timeout, 3 attempts, 2–4 s between requests per platform).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(invalid(var, format!("expected true or false, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("DEALWATCH_ENV", "development"))?;

    let bind_addr = or_default("DEALWATCH_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DEALWATCH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("DEALWATCH_LOG_LEVEL", "info");
    let backup_dir = PathBuf::from(or_default("DEALWATCH_BACKUP_DIR", "./data"));

    let scraper_request_timeout_secs = parse_u64("DEALWATCH_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "DEALWATCH_SCRAPER_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let scraper_max_retries = parse_u32("DEALWATCH_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_ms = parse_u64("DEALWATCH_SCRAPER_RETRY_BACKOFF_BASE_MS", "2000")?;
    let scraper_retry_backoff_max_ms = parse_u64("DEALWATCH_SCRAPER_RETRY_BACKOFF_MAX_MS", "30000")?;
    let scraper_min_delay_ms = parse_u64("DEALWATCH_SCRAPER_MIN_DELAY_MS", "2000")?;
    let scraper_max_delay_ms = parse_u64("DEALWATCH_SCRAPER_MAX_DELAY_MS", "4000")?;
    if scraper_min_delay_ms > scraper_max_delay_ms {
        return Err(invalid(
            "DEALWATCH_SCRAPER_MIN_DELAY_MS",
            format!(
                "{scraper_min_delay_ms} exceeds DEALWATCH_SCRAPER_MAX_DELAY_MS ({scraper_max_delay_ms})"
            ),
        ));
    }

    let scraper_detail_pages = parse_bool("DEALWATCH_SCRAPER_DETAIL_PAGES", "true")?;

    let scraper_user_agents = match lookup("DEALWATCH_SCRAPER_USER_AGENTS") {
        Ok(raw) => {
            let agents: Vec<String> = raw
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
            if agents.is_empty() {
                return Err(invalid(
                    "DEALWATCH_SCRAPER_USER_AGENTS",
                    "no user agents listed".to_string(),
                ));
            }
            agents
        }
        Err(_) => DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect(),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        backup_dir,
        scraper_request_timeout_secs,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scraper_retry_backoff_max_ms,
        scraper_min_delay_ms,
        scraper_max_delay_ms,
        scraper_user_agents,
        scraper_detail_pages,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DEALWATCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
