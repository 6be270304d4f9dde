use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed mirror row {row}: {reason}")]
    MalformedRecordError { row: usize, reason: String },

    #[error("Unknown protocol '{protocol}' for mirror url {url}")]
    UnknownProtocolError { url: String, protocol: String },

    #[error("Status feed error: {message}")]
    StatusFeedError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_)
            | EtlError::MalformedRecordError { .. }
            | EtlError::UnknownProtocolError { .. }
            | EtlError::StatusFeedError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and that the mirror host is reachable".to_string()
            }
            EtlError::IoError(_) => {
                "Check that the output location exists and is writable".to_string()
            }
            EtlError::SerializationError(_) => {
                "The result could not be encoded as JSON; re-run with --verbose".to_string()
            }
            EtlError::ConfigError { .. } => {
                "Check that the configuration file exists and is readable".to_string()
            }
            EtlError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and field names".to_string()
            }
            EtlError::MissingConfigError { field } => {
                format!("Set {} before loading the configuration", field)
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Provide a valid value for '{}'", field)
            }
            EtlError::MalformedRecordError { .. } => {
                "The tier 1 page layout may have changed; inspect the mirror table".to_string()
            }
            EtlError::UnknownProtocolError { .. } => {
                "The status feed lists a protocol this tool does not know about".to_string()
            }
            EtlError::StatusFeedError { .. } => {
                "Check that the status endpoint returns the mirror status JSON".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) if e.is_timeout() => "Request to mirror host timed out".to_string(),
            EtlError::ApiError(_) => "Could not reach the mirror host".to_string(),
            EtlError::MalformedRecordError { row, .. } => {
                format!("Tier 1 mirror table row {} could not be read", row)
            }
            EtlError::UnknownProtocolError { url, protocol } => {
                format!("Mirror {} uses unsupported protocol '{}'", url, protocol)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
