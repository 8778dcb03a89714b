use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input encoding error: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("Configuration validation failed: {message}")]
    ConfigValidationError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SplitError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SplitError::IoError(_) => ErrorSeverity::Critical,
            SplitError::ZipError(_)
            | SplitError::SerializationError(_)
            | SplitError::EncodingError(_) => ErrorSeverity::High,
            SplitError::ConfigValidationError { .. }
            | SplitError::InvalidConfigValueError { .. }
            | SplitError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SplitError::ZipError(e) => format!("Could not build the zip archive: {}", e),
            SplitError::IoError(e) => format!("File operation failed: {}", e),
            SplitError::SerializationError(e) => format!("Could not encode the report: {}", e),
            SplitError::EncodingError(_) => "The input file is not valid UTF-8 text".to_string(),
            SplitError::ConfigValidationError { message } => {
                format!("Configuration problem: {}", message)
            }
            SplitError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Invalid {}: '{}' ({})", field, value, reason),
            SplitError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SplitError::ZipError(_) => {
                "Try again without --archive to write plain CSV files".to_string()
            }
            SplitError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            SplitError::SerializationError(_) => {
                "Re-run without --report; the split files themselves are unaffected".to_string()
            }
            SplitError::EncodingError(_) => {
                "Re-save the input file as UTF-8 and try again".to_string()
            }
            SplitError::ConfigValidationError { .. } => {
                "Review the plan file against the documented format".to_string()
            }
            SplitError::InvalidConfigValueError { .. } => {
                "Fix the reported field and re-run".to_string()
            }
            SplitError::MissingConfigError { .. } => {
                "Provide the missing setting on the command line or in the plan file".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
