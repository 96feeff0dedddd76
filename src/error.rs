use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("HTML file does not exist: {path}")]
    InputNotFound { path: String },

    #[error("Could not decode {path} as {encoding} or any fallback encoding")]
    Decode { path: String, encoding: String },

    #[error("Unknown text encoding: {label}")]
    UnknownEncoding { label: String },

    #[error("Invalid selector pattern '{pattern}': {source}")]
    InvalidSelector {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("No files were created")]
    NoFilesCreated,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExtractorError {
    fn user_message(&self) -> String {
        match self {
            ExtractorError::InputNotFound { path } => {
                format!("HTML file not found: {}", path)
            }
            ExtractorError::Decode { path, encoding } => {
                format!("Failed to read {} with encoding {} (fallback also failed)", path, encoding)
            }
            ExtractorError::UnknownEncoding { label } => {
                format!("Unsupported text encoding: {}", label)
            }
            ExtractorError::InvalidSelector { pattern, .. } => {
                format!("Selector pattern is not a valid regular expression: {}", pattern)
            }
            ExtractorError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            ExtractorError::Archive { message } => {
                format!("Archive error: {}", message)
            }
            ExtractorError::NoFilesCreated => {
                "No files were created".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExtractorError::InputNotFound { .. } => Some(
                "Check the path to the saved HTML page.".to_string()
            ),
            ExtractorError::Decode { .. } => Some(
                "Pass the page's real encoding with --encoding (e.g., --encoding windows-1252).".to_string()
            ),
            ExtractorError::UnknownEncoding { .. } => Some(
                "Use a standard encoding label such as utf-8, latin-1, windows-1252 or utf-16le.".to_string()
            ),
            ExtractorError::InvalidSelector { .. } => Some(
                "Selectors are regular expressions; escape special characters like '[' or '(' with a backslash.".to_string()
            ),
            ExtractorError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate it with --generate-config.".to_string()
            ),
            ExtractorError::Archive { .. } => Some(
                "Make sure the archive directory contains metadata.json and the saved HTML file.".to_string()
            ),
            ExtractorError::NoFilesCreated => Some(
                "Check if the HTML structure matches the expected pattern, or adjust the selectors with --file-path-class, --code-table-class and --code-line-class.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(error: serde_json::Error) -> Self {
        ExtractorError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
