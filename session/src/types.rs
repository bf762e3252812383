use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period of the login-page reload that keeps the server session warm.
    pub keepalive_interval: Duration,
    /// Bound on the wait for the logout link.
    pub logout_timeout: Duration,
    /// Pause before navigating to the login page.
    pub login_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(300),
            logout_timeout: Duration::from_secs(1),
            login_settle: Duration::from_secs(1),
        }
    }
}
