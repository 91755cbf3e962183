//! Request options shared by every curl handle: identity, credentials, connect timeout.

use std::fmt;
use std::time::Duration;

use crate::config::SplitgetConfig;

/// Fixed client-identifying header value sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("splitget/", env!("CARGO_PKG_VERSION"));

/// User and password for Basic authentication.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Basic auth is only sent when both user and password are non-empty.
    pub fn is_usable(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Options applied to each curl easy handle before a request.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,
    pub credentials: Option<Credentials>,
    /// `None` leaves curl's default (no explicit deadline from us).
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            connect_timeout: None,
        }
    }
}

impl ClientOptions {
    pub fn from_config(cfg: &SplitgetConfig, credentials: Option<Credentials>) -> Self {
        Self {
            user_agent: cfg
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            credentials,
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// The credentials that will actually be sent, if any.
    pub fn basic_auth(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| c.is_usable())
    }

    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.useragent(&self.user_agent)?;
        if let Some(timeout) = self.connect_timeout {
            easy.connect_timeout(timeout)?;
        }
        if let Some(creds) = self.basic_auth() {
            easy.username(&creds.user)?;
            easy.password(&creds.password)?;
            let mut auth = curl::easy::Auth::new();
            auth.basic(true);
            easy.http_auth(&auth)?;
        }
        Ok(())
    }
}
