//! Service configuration read from an injected key/value source.
//!
//! Keys are `<SERVICE_NAME>_<SUFFIX>` where the service name is upper-cased
//! and `-` becomes `_`, for example `BOT_MANAGEMENT_URL`:
//!
//! | Suffix | Meaning |
//! |---|---|
//! | `URL` | base URL |
//! | `AUTH_TYPE` | `noauth`, `bearertoken` or `basic` |
//! | `BEARER_TOKEN` | token for `bearertoken` |
//! | `USERNAME` / `PASSWORD` | credentials for `basic` |
//! | `ENABLE_RETRIES` | `true` / `false` |
//! | `MAX_RETRIES` | retry count, `0` = default |
//! | `RETRY_INTERVAL` | maximum backoff in seconds, `0` = default |

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator,
    AUTH_TYPE_BASIC, AUTH_TYPE_BEARER_TOKEN, AUTH_TYPE_NOAUTH,
};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// A read-only source of configuration values.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory source, mainly for tests and embedding hosts.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Everything a service client needs from configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub url: Option<String>,
    pub authenticator: Arc<dyn Authenticator>,
    /// `Some` when `ENABLE_RETRIES` is true.
    pub retry: Option<RetryPolicy>,
}

impl ServiceConfig {
    pub fn load(source: &dyn ConfigSource, service_name: &str) -> Result<Self> {
        let prefix = service_name.to_uppercase().replace('-', "_");
        let lookup = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            let value = source.get(&key).filter(|v| !v.trim().is_empty());
            (key, value)
        };

        let (auth_key, auth_type) = lookup("AUTH_TYPE");
        let auth_type = auth_type.ok_or_else(|| Error::configuration(&auth_key, "not set"))?;
        let authenticator: Arc<dyn Authenticator> = match auth_type.to_lowercase().as_str() {
            AUTH_TYPE_NOAUTH => Arc::new(NoAuthAuthenticator),
            AUTH_TYPE_BEARER_TOKEN => {
                let (key, token) = lookup("BEARER_TOKEN");
                let token = token.ok_or_else(|| Error::configuration(&key, "not set"))?;
                Arc::new(BearerTokenAuthenticator::new(token)?)
            }
            AUTH_TYPE_BASIC => {
                let (user_key, username) = lookup("USERNAME");
                let (pass_key, password) = lookup("PASSWORD");
                let username = username.ok_or_else(|| Error::configuration(&user_key, "not set"))?;
                let password = password.ok_or_else(|| Error::configuration(&pass_key, "not set"))?;
                Arc::new(BasicAuthenticator::new(username, password)?)
            }
            other => {
                return Err(Error::configuration(
                    &auth_key,
                    format!("unsupported authentication type '{other}'"),
                ))
            }
        };

        let (retry_key, enable) = lookup("ENABLE_RETRIES");
        let enable = match enable {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                Error::configuration(&retry_key, format!("expected true or false, got '{v}'"))
            })?,
            None => false,
        };
        let retry = if enable {
            let max_retries = parse_number(lookup("MAX_RETRIES"))?.unwrap_or(0);
            let interval = parse_number(lookup("RETRY_INTERVAL"))?.unwrap_or(0);
            Some(RetryPolicy::new(
                u32::try_from(max_retries).unwrap_or(u32::MAX),
                Duration::from_secs(interval),
            ))
        } else {
            None
        };

        // An explicitly empty or blank URL is kept as "" so calls report
        // "service URL missing".
        let url = source
            .get(&format!("{prefix}_URL"))
            .map(|v| v.trim().to_string());

        Ok(Self {
            url,
            authenticator,
            retry,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_number((key, value): (String, Option<String>)) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| {
                Error::configuration(&key, format!("expected a non-negative integer, got '{v}'"))
            })
        })
        .transpose()
}
