// File: core/config.rs
// Client configuration: site root, timeouts, User-Agent and the session cookie.

use super::error::{CoreError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://www.tucao.one/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; Android 7.1.1) AppleWebKit/537.36 (KHTML, like Gecko) tucao-client/0.1";
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

const ENV_BASE_URL: &str = "TUCAO_BASE_URL";
const ENV_TIMEOUT: &str = "TUCAO_TIMEOUT_SECS";
const ENV_USER_AGENT: &str = "TUCAO_USER_AGENT";
const ENV_SESSION_COOKIE: &str = "TUCAO_SESSION_COOKIE";

/// Cookie attached to every member-only request.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `name=value`.
    pub fn parse(raw: &str) -> Result<Self> {
        let (name, value) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidConfig(format!("cookie is not name=value: {raw}")))?;
        if name.trim().is_empty() {
            return Err(CoreError::InvalidConfig("cookie name is empty".to_string()));
        }
        Ok(Self::new(name.trim(), value.trim()))
    }

    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new("tucao_verify", "ok")
    }
}

// Value stays out of logs.
impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub session_cookie: Option<SessionCookie>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("static base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SEC),
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SEC),
            session_cookie: Some(SessionCookie::default()),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `TUCAO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| CoreError::InvalidConfig(format!("{ENV_TIMEOUT}={raw}: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(ENV_USER_AGENT) {
            if !raw.trim().is_empty() {
                config.user_agent = raw.trim().to_string();
            }
        }
        if let Some(raw) = lookup(ENV_SESSION_COOKIE) {
            config.session_cookie = if raw.trim().is_empty() {
                None
            } else {
                Some(SessionCookie::parse(&raw)?)
            };
        }

        log::debug!("Resolved client config: {:?}", config);
        Ok(config)
    }

    /// Relative endpoint paths are joined onto this, so it always ends with `/`.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        let mut url = Url::parse(raw.trim())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = timeout;
        self
    }

    pub fn with_session_cookie(mut self, cookie: SessionCookie) -> Self {
        self.session_cookie = Some(cookie);
        self
    }

    pub fn without_session_cookie(mut self) -> Self {
        self.session_cookie = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.session_cookie.unwrap().header_value(),
            "tucao_verify=ok"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://mirror.example.org/site"),
            (ENV_TIMEOUT, "5"),
            (ENV_SESSION_COOKIE, "session=abc"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://mirror.example.org/site/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(
            config.session_cookie,
            Some(SessionCookie::new("session", "abc"))
        );
    }

    #[test]
    fn test_empty_cookie_disables_session() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENV_SESSION_COOKIE, "")])).unwrap();
        assert!(config.session_cookie.is_none());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));

        let err =
            ClientConfig::from_lookup(lookup_from(&[(ENV_SESSION_COOKIE, "novalue")])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));

        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, CoreError::UrlParse(_)));
    }

    #[test]
    fn test_cookie_debug_is_redacted() {
        let rendered = format!("{:?}", SessionCookie::new("session", "secret"));
        assert!(!rendered.contains("secret"));
    }
}
