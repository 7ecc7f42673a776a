use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which authentication scheme to use for a call.
///
/// Marker enum (no data) -- the actual credentials live in [`Auth`].
/// Useful for branching on auth flow without carrying secret material.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthScheme {
    /// HTTP Basic credentials (user + password).
    #[default]
    Basic,
    /// `Authorization: Bearer <token>` header.
    Bearer,
}

/// Credentials attached to a single request.
///
/// Exactly one scheme is active per call. Auth is always passed explicitly
/// to each request method; clients never keep a default credential around.
#[derive(Debug, Clone)]
pub enum Auth {
    Basic { user: String, password: SecretString },
    Bearer { token: SecretString },
}

impl Auth {
    /// Build an auth descriptor from a scheme selector and optional inputs.
    ///
    /// Fails fast with [`Error::Configuration`] when the inputs the scheme
    /// needs are missing. Pure: no I/O.
    pub fn resolve(
        scheme: AuthScheme,
        user: Option<&str>,
        password: Option<&SecretString>,
        token: Option<&SecretString>,
    ) -> Result<Self, Error> {
        match scheme {
            AuthScheme::Bearer => {
                let token = token.ok_or_else(|| Error::Configuration {
                    message: "token must be set when using BEARER auth".into(),
                })?;
                Ok(Self::Bearer {
                    token: token.clone(),
                })
            }
            AuthScheme::Basic => match (user, password) {
                (Some(user), Some(password)) => Ok(Self::Basic {
                    user: user.to_owned(),
                    password: password.clone(),
                }),
                _ => Err(Error::Configuration {
                    message: "user and password must be set when using BASIC auth".into(),
                }),
            },
        }
    }

    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            user: user.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::from(token.into()),
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Basic { .. } => AuthScheme::Basic,
            Self::Bearer { .. } => AuthScheme::Bearer,
        }
    }

    /// The `Authorization` header value for bearer auth. `None` for basic,
    /// which reqwest encodes itself.
    pub fn bearer_header(&self) -> Option<String> {
        match self {
            Self::Bearer { token } => Some(format!("Bearer {}", token.expose_secret())),
            Self::Basic { .. } => None,
        }
    }

    /// Attach these credentials to an outgoing request.
    pub(crate) fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Basic { user, password } => req.basic_auth(user, Some(password.expose_secret())),
            Self::Bearer { token } => req.bearer_auth(token.expose_secret()),
        }
    }
}
