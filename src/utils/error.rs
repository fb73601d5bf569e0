use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No import text was supplied")]
    MissingInput,

    #[error("Invalid row limit: {value} (must be at least 1)")]
    InvalidRowLimit { value: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Input is not valid UTF-8: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Platform error: {0}")]
    PlatformError(#[from] PlatformError),
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Io,
    Platform,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::MissingInput
            | ImportError::InvalidRowLimit { .. }
            | ImportError::EncodingError(_) => ErrorCategory::Input,
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ImportError::IoError(_)
            | ImportError::SerializationError(_)
            | ImportError::CsvError(_) => ErrorCategory::Io,
            ImportError::PlatformError(_) => ErrorCategory::Platform,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Platform => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::MissingInput => "Provide the rows with --input <file> or pipe them on stdin",
            ImportError::InvalidRowLimit { .. } => "Use a row limit of 1 or more",
            ImportError::EncodingError(_) => "Save the input file as UTF-8",
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => {
                "Check the configuration file against the documented [import] and [network] keys"
            }
            ImportError::IoError(_) => "Check that the file exists and the path is writable",
            ImportError::SerializationError(_) => "Check that the platform snapshot is valid JSON",
            ImportError::CsvError(_) => "Check that the report output path is writable",
            ImportError::PlatformError(_) => "Inspect the platform state and retry the import",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::MissingInput => "Nothing to import: no rows were supplied".to_string(),
            ImportError::IoError(e) => format!("Could not access a file: {}", e),
            other => other.to_string(),
        }
    }
}

/// Failure reported by an external collaborator (user directory, site platform, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
pub type PortResult<T> = std::result::Result<T, PlatformError>;
