//! Errors shared by every Leadscout crate.

use thiserror::Error;

/// Error returned by the shared Leadscout types.
#[derive(Error, Debug)]
pub enum LeadscoutError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A candidate failed lead validation
    #[error("lead rejected: {0}")]
    Lead(#[from] LeadError),

    /// A source name that matches none of the supported portals
    #[error("unknown source '{0}'")]
    UnknownSource(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems reading, writing or validating `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No platform config directory could be resolved
    #[error("no home directory to place leadscout configuration in")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where the file was expected
        path: String,
    },

    /// The file is not valid TOML for [`crate::AppConfig`]
    #[error("config file is not valid TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Serializing the config failed
    #[error("config could not be written as TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading or writing the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value parsed but is outside its allowed range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending key
        field: String,
        /// What the value must satisfy
        reason: String,
    },
}

/// Reasons a candidate record cannot become a [`crate::Lead`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeadError {
    /// No usable phone number was resolved
    #[error("lead has no phone number")]
    EmptyPhone,

    /// No external identifier could be derived
    #[error("lead has no external id")]
    EmptyExternalId,

    /// Coordinates resolved but the listing lies outside the search radius
    #[error("listing is {distance_km:.1} km from the reference point")]
    OutOfRadius {
        /// Distance from the reference point
        distance_km: f64,
    },
}

/// Result type alias using `LeadscoutError`.
pub type Result<T> = std::result::Result<T, LeadscoutError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LeadscoutError::UnknownSource("wallapop".to_string());
        assert_eq!(err.to_string(), "unknown source 'wallapop'");

        let err = ConfigError::InvalidValue {
            field: "crawl.max_leads".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for crawl.max_leads: must be at least 1"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: LeadscoutError = config_err.into();
        assert!(matches!(err, LeadscoutError::Config(_)));
    }

    #[test]
    fn test_out_of_radius_display() {
        let err = LeadError::OutOfRadius { distance_km: 504.96 };
        assert_eq!(
            err.to_string(),
            "listing is 505.0 km from the reference point"
        );
    }
}
