use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid trip: {0}")]
    Validation(String),
    #[error("invalid index {index} for {len} trips")]
    InvalidIndex { index: i64, len: usize },
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    #[error("no city code known for {0:?}")]
    UnknownCity(String),
    #[error("no fare data: {0}")]
    NoFareData(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Line shown at the prompt for a failed command.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Some of the parameters are not valid!".into(),
            AppError::InvalidIndex { .. } => "Invalid index.".into(),
            AppError::InvalidSelector(_) => "Incorrect choice!".into(),
            AppError::FileNotFound(path) => format!("File '{}' not found.", path.display()),
            AppError::Json(_) => "Error decoding JSON data.".into(),
            AppError::UnknownCity(_) | AppError::NoFareData(_) => {
                "Failed to retrieve ticket price information!".into()
            }
            other => format!("Error: {other}"),
        }
    }
}
