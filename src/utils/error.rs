use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Mapping configuration error: {message}")]
    MappingError { message: String },

    #[error("Data error in {dataset}: {message}")]
    DataError { dataset: String, message: String },

    #[error("{dataset} dataset has no '{column}' column")]
    MissingColumn { dataset: String, column: String },

    #[error("{dataset} row {row}: employee identifier '{value}' is not an integer")]
    InvalidIdentifier {
        dataset: String,
        row: usize,
        value: String,
    },

    #[error("{dataset} dataset could not be loaded: {reason}")]
    DatasetUnavailable { dataset: String, reason: String },

    #[error("Report error: {message}")]
    ReportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Io,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReconError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MappingError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::SpreadsheetError(_)
            | Self::DataError { .. }
            | Self::MissingColumn { .. }
            | Self::InvalidIdentifier { .. }
            | Self::DatasetUnavailable { .. } => ErrorCategory::Data,
            Self::SerializationError(_) | Self::ReportError { .. } => ErrorCategory::Report,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // A mapping that cannot be read means nothing can be reconciled.
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Io | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Report => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the input files exist and are not open in another program",
            Self::CsvError(_) | Self::SpreadsheetError(_) => {
                "Re-export the file from the payroll system and make sure it is a valid spreadsheet"
            }
            Self::MappingError { .. } => {
                "Make sure the mapping file has both 'mappings' and 'not_used' collections and every entry has a 'vendor'"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML run file"
            }
            Self::MissingColumn { .. } => "Check the layout settings (leading columns, identity column name)",
            Self::InvalidIdentifier { .. } | Self::DataError { .. } => {
                "Fix the offending cell in the source export and run again"
            }
            Self::DatasetUnavailable { .. } => "Fix the dataset load error reported above",
            Self::SerializationError(_) | Self::ReportError { .. } => {
                "Check that the output directory is writable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Input data problem: {}", self),
            ErrorCategory::Io => format!("File access problem: {}", self),
            ErrorCategory::Report => format!("Could not write the report: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_errors_are_critical() {
        let err = ReconError::MappingError {
            message: "missing 'not_used'".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_config_value_errors_are_critical() {
        let err = ReconError::InvalidConfigValueError {
            field: "checks.enabled".to_string(),
            value: "bogus".to_string(),
            reason: "Unknown check".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.recovery_suggestion(),
            "Review the command line flags or the TOML run file"
        );
    }

    #[test]
    fn test_identifier_errors_are_data_errors() {
        let err = ReconError::InvalidIdentifier {
            dataset: "GTN".to_string(),
            row: 4,
            value: "abc".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.to_string().contains("'abc'"));
        assert!(err.user_friendly_message().starts_with("Input data problem"));
    }
}
