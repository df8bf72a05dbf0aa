use leadscout_core::SourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("anti-bot challenge detected on {site} while reading {stage}")]
    ChallengeDetected { site: SourceId, stage: String },

    #[error("Browser error: {0}")]
    Browser(#[from] leadscout_browser::BrowserError),

    #[error("adapter for {site} panicked: {message}")]
    AdapterPanicked { site: SourceId, message: String },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_display() {
        let err = ScrapeError::ChallengeDetected {
            site: SourceId::Idealista,
            stage: "detail page".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "anti-bot challenge detected on idealista while reading detail page"
        );
    }
}
