use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Address source error: {message}")]
    AddressSourceError { message: String },

    #[error("List membership resolution failed: {message}")]
    MembershipError { message: String },

    #[error("Batch assignment error: {message}")]
    AssignmentError { message: String },

    #[error("Invalid state: {message}")]
    InvalidStateError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Data,
    Collaborator,
    State,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn membership(message: impl Into<String>) -> Self {
        MapError::MembershipError {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        MapError::InvalidStateError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. } => ErrorCategory::Config,
            MapError::SerializationError(_) => ErrorCategory::Data,
            MapError::AddressSourceError { .. }
            | MapError::MembershipError { .. }
            | MapError::AssignmentError { .. } => ErrorCategory::Collaborator,
            MapError::InvalidStateError { .. } => ErrorCategory::State,
            MapError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 焦點切換失敗時保留先前狀態，地圖仍可使用
            MapError::MembershipError { .. } | MapError::AssignmentError { .. } => {
                ErrorSeverity::Medium
            }
            MapError::InvalidStateError { .. } => ErrorSeverity::Low,
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. }
            | MapError::MissingConfigError { .. }
            | MapError::SerializationError(_)
            | MapError::AddressSourceError { .. } => ErrorSeverity::High,
            MapError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapError::IoError(e) => format!("Could not read or write a file: {}", e),
            MapError::SerializationError(e) => format!("The data file is not valid JSON: {}", e),
            MapError::ConfigError { message } => format!("Configuration problem: {}", message),
            MapError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            MapError::InvalidConfigValueError { field, value, reason } => {
                format!("Setting '{}' has an invalid value '{}': {}", field, value, reason)
            }
            MapError::MissingConfigError { field } => {
                format!("Setting '{}' is required but missing", field)
            }
            MapError::AddressSourceError { message } => {
                format!("Addresses could not be loaded: {}", message)
            }
            MapError::MembershipError { message } => {
                format!("The selected lists could not be loaded: {}", message)
            }
            MapError::AssignmentError { message } => {
                format!("The selection could not be assigned: {}", message)
            }
            MapError::InvalidStateError { message } => {
                format!("That action is not possible right now: {}", message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Config => "Check the map configuration file and environment variables",
            ErrorCategory::Data => "Verify the address and membership export files",
            ErrorCategory::Collaborator => "Retry the action; the previous map state was kept",
            ErrorCategory::State => "Finish or cancel the current drawing before retrying",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
