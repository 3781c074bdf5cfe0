use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set!")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server and relevance.ai settings loaded from environment variables.
///
/// | Env Var                         | Default                 |
/// |---------------------------------|-------------------------|
/// | `RELEVANCE_REGION`              | required                |
/// | `RELEVANCE_API_BASE_URL`        | required                |
/// | `RELEVANCE_PROJECT_ID`          | required                |
/// | `RELEVANCE_API_KEY`             | required                |
/// | `RELEVANCE_AUTHORIZATION_TOKEN` | `{project_id}:{api_key}`|
/// | `DATABASE_URL`                  | unset (in-memory store) |
/// | `HOST`                          | `0.0.0.0`               |
/// | `PORT`                          | `3000`                  |
/// | `MAX_POLL_ATTEMPTS`             | `120`                   |
/// | `POLL_DELAY_MILLIS`             | `1000`                  |
/// | `RELEVANCE_TIMEOUT_SECS`        | `30`                    |
#[derive(Debug, Clone)]
pub struct Config {
    pub relevance_region: String,
    /// Base URL template; `{region}` is substituted with `relevance_region`.
    pub relevance_api_base_url: String,
    pub relevance_project_id: String,
    /// Defaults to `{project_id}:{api_key}`.
    pub relevance_authorization_token: String,
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    pub max_poll_attempts: u32,
    pub poll_delay: Duration,
    pub relevance_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let relevance_region = required("RELEVANCE_REGION")?;
        let relevance_api_base_url = required("RELEVANCE_API_BASE_URL")?;
        let relevance_project_id = required("RELEVANCE_PROJECT_ID")?;
        let relevance_api_key = required("RELEVANCE_API_KEY")?;
        let relevance_authorization_token = lookup("RELEVANCE_AUTHORIZATION_TOKEN")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{relevance_project_id}:{relevance_api_key}"));
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());

        let host = parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&lookup, "PORT", 3000u16)?;
        let max_poll_attempts = parse_or(&lookup, "MAX_POLL_ATTEMPTS", 120u32)?;
        let poll_delay = Duration::from_millis(parse_or(&lookup, "POLL_DELAY_MILLIS", 1_000u64)?);
        let relevance_timeout =
            Duration::from_secs(parse_or(&lookup, "RELEVANCE_TIMEOUT_SECS", 30u64)?);

        Ok(Self {
            relevance_region,
            relevance_api_base_url,
            relevance_project_id,
            relevance_authorization_token,
            database_url,
            host,
            port,
            max_poll_attempts,
            poll_delay,
            relevance_timeout,
        })
    }

    /// Region-specific relevance.ai API root, without a trailing slash.
    pub fn relevance_base_url(&self) -> String {
        self.relevance_api_base_url
            .replace("{region}", &self.relevance_region)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("RELEVANCE_REGION", "bcbe5a"),
        (
            "RELEVANCE_API_BASE_URL",
            "https://api-{region}.stack.tryrelevance.com/latest/",
        ),
        ("RELEVANCE_PROJECT_ID", "proj"),
        ("RELEVANCE_API_KEY", "key"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert_eq!(config.relevance_authorization_token, "proj:key");
        assert_eq!(config.max_poll_attempts, 120);
        assert_eq!(config.poll_delay, Duration::from_secs(1));
        assert_eq!(config.relevance_timeout, Duration::from_secs(30));
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn base_url_substitutes_region() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).unwrap();
        assert_eq!(
            config.relevance_base_url(),
            "https://api-bcbe5a.stack.tryrelevance.com/latest"
        );
    }

    #[test]
    fn explicit_authorization_token_wins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RELEVANCE_AUTHORIZATION_TOKEN", "proj:other"));
        pairs.push(("POLL_DELAY_MILLIS", "250"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.relevance_authorization_token, "proj:other");
        assert_eq!(config.poll_delay, Duration::from_millis(250));
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..3])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("RELEVANCE_API_KEY")));
    }

    #[test]
    fn invalid_number_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
