//! Authenticators decorate an outgoing request with credentials.
//!
//! Token acquisition (IAM exchange and friends) is not done here; callers
//! that hold a token use [`BearerTokenAuthenticator`].

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};
use crate::http::{set_header, HttpRequest};

pub const AUTH_TYPE_NOAUTH: &str = "noauth";
pub const AUTH_TYPE_BEARER_TOKEN: &str = "bearertoken";
pub const AUTH_TYPE_BASIC: &str = "basic";

/// Adds credentials to a rendered request.
pub trait Authenticator: fmt::Debug + Send + Sync {
    fn auth_type(&self) -> &'static str;

    /// Check the authenticator's own configuration.
    fn validate(&self) -> Result<()>;

    fn authenticate(&self, request: &mut HttpRequest) -> Result<()>;
}

/// Sends requests without credentials.
#[derive(Debug, Clone, Default)]
pub struct NoAuthAuthenticator;

impl Authenticator for NoAuthAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_NOAUTH
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn authenticate(&self, _request: &mut HttpRequest) -> Result<()> {
        Ok(())
    }
}

/// Sends `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let auth = Self {
            token: token.into(),
        };
        auth.validate()?;
        Ok(auth)
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_BEARER_TOKEN
    }

    fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::validation("bearer token is required"));
        }
        Ok(())
    }

    fn authenticate(&self, request: &mut HttpRequest) -> Result<()> {
        set_header(
            &mut request.headers,
            "Authorization",
            &format!("Bearer {}", self.token),
        );
        Ok(())
    }
}

/// Sends `Authorization: Basic base64(username:password)`.
#[derive(Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let auth = Self {
            username: username.into(),
            password: password.into(),
        };
        auth.validate()?;
        Ok(auth)
    }
}

impl fmt::Debug for BasicAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BasicAuthenticator {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE_BASIC
    }

    fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::validation("username and password are required"));
        }
        for value in [&self.username, &self.password] {
            if value.starts_with(['{', '"']) || value.ends_with(['}', '"']) {
                return Err(Error::validation(
                    "username and password must not be wrapped in braces or quotes",
                ));
            }
        }
        Ok(())
    }

    fn authenticate(&self, request: &mut HttpRequest) -> Result<()> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        set_header(
            &mut request.headers,
            "Authorization",
            &format!("Basic {encoded}"),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "https://api.cis.cloud.ibm.com/v1/ips".to_string(),
            headers: vec![("authorization".to_string(), "stale".to_string())],
            body: None,
        }
    }

    #[test]
    fn noauth_leaves_request_alone() {
        let mut req = request();
        NoAuthAuthenticator.authenticate(&mut req).unwrap();
        assert_eq!(req, request());
    }

    #[test]
    fn bearer_sets_authorization() {
        let auth = BearerTokenAuthenticator::new("tok").unwrap();
        let mut req = request();
        auth.authenticate(&mut req).unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn bearer_rejects_empty_token() {
        assert!(matches!(
            BearerTokenAuthenticator::new("  "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn basic_encodes_credentials() {
        let auth = BasicAuthenticator::new("user", "pass").unwrap();
        let mut req = request();
        auth.authenticate(&mut req).unwrap();
        assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn basic_rejects_quoted_credentials() {
        assert!(BasicAuthenticator::new("{user}", "pass").is_err());
        assert!(BasicAuthenticator::new("user", "").is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let auth = BearerTokenAuthenticator::new("secret-token").unwrap();
        assert!(!format!("{auth:?}").contains("secret-token"));
        let auth = BasicAuthenticator::new("user", "hunter2").unwrap();
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
