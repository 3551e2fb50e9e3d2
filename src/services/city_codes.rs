use std::{io::Read, path::Path};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};

use crate::error::AppError;

const BUNDLED: &str = include_str!("../../data/city_codes.csv");

#[derive(Debug, Clone, PartialEq, Eq)]
struct CityEntry {
    code: String,
    alias: Option<String>,
}

/// Static code table. Each row is `CODE, native/alias`; only the part after
/// the single `/` is matched, so rows without one cannot be looked up by name.
#[derive(Debug, Clone, Default)]
pub struct CityCodeTable {
    entries: Vec<CityEntry>,
}

impl CityCodeTable {
    /// The table compiled into the binary.
    pub fn bundled() -> Self {
        match Self::from_reader(BUNDLED.as_bytes()) {
            Ok(table) => table,
            Err(err) => {
                warn!(error = %err, "bundled city codes unreadable");
                Self::default()
            }
        }
    }

    /// Loads `path` when given, falling back to the bundled table if it
    /// cannot be read. Start-up never fails on the city table.
    pub async fn load_or_bundled(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };
        match Self::load(path).await {
            Ok(table) => table,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "using bundled city codes");
                Self::bundled()
            }
        }
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let raw = tokio::fs::read(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AppError::FileNotFound(path.to_path_buf())
            } else {
                AppError::Io(err)
            }
        })?;
        let table = Self::from_reader(raw.as_slice())?;
        info!(path = %path.display(), entries = table.len(), "city codes loaded");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in csv.records() {
            let record = record?;
            let Some(code) = record.get(0).filter(|code| !code.is_empty()) else {
                continue;
            };
            let alias = record.get(1).and_then(alias_of);
            entries.push(CityEntry {
                code: code.to_string(),
                alias,
            });
        }
        Ok(Self { entries })
    }

    /// Case-insensitive lookup of `city_name` against the aliases.
    pub fn resolve(&self, city_name: &str) -> Option<&str> {
        let wanted = city_name.to_lowercase();
        let found = self
            .entries
            .iter()
            .find(|entry| entry.alias.as_deref() == Some(wanted.as_str()))
            .map(|entry| entry.code.as_str());
        if found.is_none() {
            debug!(city = %city_name, "no city code");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn alias_of(names: &str) -> Option<String> {
    let mut parts = names.split('/');
    let (_native, alias) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some(alias.trim().to_lowercase())
}
