use crate::errors::SkaldError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IniError {
    #[error("Failed to open INI file '{path}' for reading: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write INI file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SkaldError for IniError {
    fn error_code(&self) -> &'static str {
        match self {
            IniError::ReadFailed { .. } => "INI_READ_FAILED",
            IniError::WriteFailed { .. } => "INI_WRITE_FAILED",
        }
    }
}
