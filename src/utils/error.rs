use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No user id left after {last_id}")]
    IdSpaceExhausted { last_id: i64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Data,
    Configuration,
    Input,
}

impl CatalogError {
    /// Codec-level failure; `line` is filled in by the loader (0 = not from a file).
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line: 0,
            reason: reason.into(),
        }
    }

    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Self::MalformedRecord { reason, .. } => Self::MalformedRecord { line, reason },
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) | Self::WriteFailure { .. } => ErrorCategory::Storage,
            Self::CsvError(_) | Self::MalformedRecord { .. } | Self::IdSpaceExhausted { .. } => {
                ErrorCategory::Data
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MalformedRecord { line, .. } => format!(
                "資料檔第 {} 行格式錯誤，請使用 'author,title,number,boolean' 或 'id,name,password,role'",
                line
            ),
            Self::WriteFailure { path, .. } => {
                format!("無法寫入 {}，請檢查權限與磁碟空間", path.display())
            }
            Self::ValidationError { message } => format!("輸入無效: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
