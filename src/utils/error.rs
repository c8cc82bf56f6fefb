use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid file pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{file}: malformed XML: {source}")]
    MalformedXml {
        file: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("{file}: no TestStep elements found")]
    NoTestSteps { file: String },

    #[error("{file} missing column(s) {missing:?}. Present: {present:?}")]
    MissingColumns {
        file: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("No files matching '{pattern}' found in {folder}")]
    NoInputFiles { folder: String, pattern: String },

    #[error("No parseable XML files ({attempted} tried). Check the TestStep path or column names")]
    NoParseableFiles { attempted: usize },

    #[error("Failed to write report to {path}: {source}")]
    OutputWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
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

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::PatternError(_) => ErrorCategory::Configuration,
            EtlError::MalformedXml { .. }
            | EtlError::NoTestSteps { .. }
            | EtlError::MissingColumns { .. }
            | EtlError::NoInputFiles { .. }
            | EtlError::NoParseableFiles { .. } => ErrorCategory::Input,
            EtlError::IoError(_) | EtlError::OutputWriteError { .. } | EtlError::XlsxError(_) => {
                ErrorCategory::Output
            }
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // a single bad file only drops that file
            EtlError::MalformedXml { .. }
            | EtlError::NoTestSteps { .. }
            | EtlError::MissingColumns { .. } => ErrorSeverity::Low,
            EtlError::OutputWriteError { .. } | EtlError::IoError(_) => ErrorSeverity::Medium,
            EtlError::XlsxError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// True for errors that reject one input file without ending the run.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            EtlError::MalformedXml { .. }
                | EtlError::NoTestSteps { .. }
                | EtlError::MissingColumns { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::NoInputFiles { .. } => {
                "Point --folder at the directory holding the exported XML reports".to_string()
            }
            EtlError::NoParseableFiles { .. } => {
                "Every file was skipped; check the warnings above for missing columns".to_string()
            }
            EtlError::MissingColumns { .. } => {
                "Export the report with Serial_No, Band, UL_DL_Chans, Test and MeasValue"
                    .to_string()
            }
            EtlError::MalformedXml { .. } | EtlError::NoTestSteps { .. } => {
                "Re-export the file from the test station".to_string()
            }
            EtlError::OutputWriteError { .. } | EtlError::IoError(_) => {
                "Close the workbook if it is open in Excel and check folder permissions"
                    .to_string()
            }
            EtlError::PatternError(_) => "Use a glob such as *.xml for --pattern".to_string(),
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration file or command line options".to_string()
            }
            EtlError::XlsxError(_) | EtlError::ProcessingError { .. } => {
                "Run again with --verbose and report the log".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NoInputFiles { folder, .. } => format!("No XML files found in {}", folder),
            EtlError::NoParseableFiles { .. } => "No parseable XML files".to_string(),
            EtlError::OutputWriteError { path, .. } => format!("Could not save {}", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
