use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("navigation to {url} timed out after {timeout_ms} ms")]
    NavigationTimeout { url: String, timeout_ms: u128 },

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("script evaluation failed: {0}")]
    ScriptError(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl BrowserError {
    /// Whether this error is a navigation timeout, which callers treat as
    /// the end of the current section rather than a failure.
    #[must_use]
    pub fn is_navigation_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout { .. })
    }
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::ChromiumError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_navigation_timeout() {
        let err = BrowserError::NavigationTimeout {
            url: "https://www.milanuncios.com/".to_string(),
            timeout_ms: 30_000,
        };
        assert!(err.is_navigation_timeout());
        assert!(err.to_string().contains("30000 ms"));
        assert!(!BrowserError::Timeout("x".to_string()).is_navigation_timeout());
    }
}
