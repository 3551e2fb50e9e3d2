use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::{info, warn};

use crate::{error::AppError, models::trip::Trip};

/// What happened while importing; the trips are returned either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    Imported,
    NotFound,
    Malformed(String),
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub trips: Vec<Trip>,
    pub status: ImportStatus,
}

impl ImportOutcome {
    fn empty(status: ImportStatus) -> Self {
        Self {
            trips: Vec::new(),
            status,
        }
    }
}

#[derive(Clone)]
pub struct StorageService {
    path: Arc<PathBuf>,
}

impl StorageService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every trip as a JSON array (4-space indent), replacing the file.
    pub async fn export(&self, trips: &[Trip]) -> Result<(), AppError> {
        let data = encode_trips(trips)?;
        if let Some(parent) = self.path().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(self.path(), data).await?;
        info!(path = %self.path().display(), count = trips.len(), "trips exported");
        Ok(())
    }

    /// Loads trips without validating them. Failures degrade to an empty list.
    pub async fn import(&self) -> ImportOutcome {
        let path = self.path();
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "trip file not found");
                return ImportOutcome::empty(ImportStatus::NotFound);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "trip file unreadable");
                return ImportOutcome::empty(ImportStatus::Unreadable(err.to_string()));
            }
        };

        match serde_json::from_slice::<Vec<Trip>>(&raw) {
            Ok(trips) => {
                info!(path = %path.display(), count = trips.len(), "trips imported");
                ImportOutcome {
                    trips,
                    status: ImportStatus::Imported,
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "trip file is not valid JSON");
                ImportOutcome::empty(ImportStatus::Malformed(err.to_string()))
            }
        }
    }
}

fn encode_trips(trips: &[Trip]) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut data, PrettyFormatter::with_indent(b"    "));
    trips.serialize(&mut serializer)?;
    Ok(data)
}
