use thiserror::Error;

#[derive(Error, Debug)]
pub enum DngMetaError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Directory traversal failed: {message}")]
    Walk {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot write output file {path}: {source}")]
    OutputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DngMetaError {
    fn user_message(&self) -> String {
        match self {
            DngMetaError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            DngMetaError::InvalidArguments { message } => {
                format!("Invalid arguments: {}", message)
            }
            DngMetaError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            DngMetaError::Walk { message, .. } => {
                format!("Could not walk directory tree: {}", message)
            }
            DngMetaError::OutputFile { path, source } => {
                format!("Cannot write output file {}: {}", path, source)
            }
            DngMetaError::Decode { path, reason } => {
                format!("Could not decode {}: {}", path, reason)
            }
            DngMetaError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DngMetaError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config."
                    .to_string(),
            ),
            DngMetaError::InvalidArguments { .. } => {
                Some("Run with --help to see the accepted options.".to_string())
            }
            DngMetaError::InvalidPath { .. } | DngMetaError::Walk { .. } => Some(
                "Make sure --root_dir points to an existing, readable directory.".to_string(),
            ),
            DngMetaError::OutputFile { .. } => Some(
                "Make sure the parent directory of --outfile exists and is writable.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for DngMetaError {
    fn from(error: walkdir::Error) -> Self {
        let message = match error.path() {
            Some(path) => format!("{}: {}", path.display(), error),
            None => error.to_string(),
        };
        DngMetaError::Walk {
            message,
            source: error,
        }
    }
}

impl From<regex::Error> for DngMetaError {
    fn from(error: regex::Error) -> Self {
        DngMetaError::Config {
            message: format!("Invalid exclude pattern: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, DngMetaError>;
