use thiserror::Error;

/// Failures raised while driving a page.
///
/// Every variant is transient from the caller's point of view: the session
/// manager, list cache and scheduler log it and carry on.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("timed out after {timeout_ms}ms waiting for `{target}`")]
    Timeout { target: String, timeout_ms: u64 },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("page is closed")]
    Closed,

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl SiteError {
    pub fn timeout(target: impl Into<String>, timeout: std::time::Duration) -> Self {
        SiteError::Timeout {
            target: target.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

impl From<chromiumoxide::error::CdpError> for SiteError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        SiteError::Browser(e.to_string())
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(e: serde_json::Error) -> Self {
        SiteError::Script(e.to_string())
    }
}
