use std::{fmt, time::Duration};

pub const DEFAULT_PORT: u16 = 8728;
pub const DEFAULT_TLS_PORT: u16 = 8729;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters for a [`Session`](super::Session).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    port: Option<u16>,
    pub tls: bool,
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: None,
            tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The explicit port, or the default for the selected mode.
    pub fn port(&self) -> u16 {
        match (self.port, self.tls) {
            (Some(port), _) => port,
            (None, true) => DEFAULT_TLS_PORT,
            (None, false) => DEFAULT_PORT,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("port", &self.port())
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_follow_tls() {
        let config = SessionConfig::new("192.168.88.1", "admin", "");
        assert_eq!(config.port(), 8728);

        let config = config.with_tls(true);
        assert_eq!(config.port(), 8729);

        let config = config.with_port(9000);
        assert_eq!(config.port(), 9000);
    }

    #[test]
    fn debug_masks_password() {
        let config = SessionConfig::new("router", "admin", "hunter2");
        let out = format!("{config:?}");

        assert!(!out.contains("hunter2"));
        assert!(out.contains("admin"));
    }
}
