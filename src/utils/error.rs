use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Price catalog error: {message}")]
    CatalogError { message: String },

    #[error("Invalid parcel record '{parcel_id}': {reason}")]
    InvalidRecord { parcel_id: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Catalog,
    Input,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ValuationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ValuationError::ConfigError { .. }
            | ValuationError::MissingConfigError { .. }
            | ValuationError::InvalidConfigValueError { .. }
            | ValuationError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ValuationError::CatalogError { .. } => ErrorCategory::Catalog,
            ValuationError::InvalidRecord { .. }
            | ValuationError::SerializationError(_) => ErrorCategory::Input,
            ValuationError::ZipError(_) | ValuationError::CsvError(_) | ValuationError::IoError(_) => {
                ErrorCategory::Output
            }
            ValuationError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // A bad record is recorded in the batch and the run carries on.
            ValuationError::InvalidRecord { .. } => ErrorSeverity::Low,
            ValuationError::SerializationError(_) => ErrorSeverity::Medium,
            ValuationError::ZipError(_)
            | ValuationError::CsvError(_)
            | ValuationError::IoError(_)
            | ValuationError::ProcessingError { .. } => ErrorSeverity::High,
            ValuationError::ConfigError { .. }
            | ValuationError::MissingConfigError { .. }
            | ValuationError::InvalidConfigValueError { .. }
            | ValuationError::ConfigValidationError { .. }
            | ValuationError::CatalogError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or the TOML run configuration"
            }
            ErrorCategory::Catalog => {
                "Check that the price catalog and territory mapping files exist and contain a 'default' territory and category"
            }
            ErrorCategory::Input => {
                "Check that the parcel records and reference values are valid JSON documents"
            }
            ErrorCategory::Output => "Check that the output path exists and is writable",
            ErrorCategory::Processing => "Re-run with --verbose and inspect the logs",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ValuationError::CatalogError { message } => {
                format!("The price catalog could not be used: {}", message)
            }
            ValuationError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            ValuationError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            ValuationError::InvalidRecord { parcel_id, reason } => {
                format!("Parcel '{}' could not be valued: {}", parcel_id, reason)
            }
            ValuationError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        ValuationError::CatalogError {
            message: message.into(),
        }
    }

    pub fn invalid_record(parcel_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ValuationError::InvalidRecord {
            parcel_id: parcel_id.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValuationError>;
