//! Level record persistence
//!
//! One JSON document per level under a store directory. The editor invokes
//! this explicitly; the in-memory history never touches disk. Corrupt or
//! missing records surface as errors for the menu/editor layer to fall
//! back on the default layout.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::level::{LevelMeta, LevelSnapshot};

/// Failures surfaced to the editor and menu layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("level {0} not found")]
    Missing(u32),
    #[error("level {id} record is corrupt: {source}")]
    Corrupt {
        id: u32,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The persistence collaborator boundary
pub trait LevelStore {
    /// Persist a snapshot, returning the record id it was stored under
    fn save_level(&mut self, level: &LevelSnapshot) -> Result<u32, StoreError>;
    fn load_level(&self, id: u32) -> Result<LevelSnapshot, StoreError>;
    fn list_levels(&self) -> Result<Vec<LevelMeta>, StoreError>;
}

/// Directory of `level_NNNN.json` records
#[derive(Debug)]
pub struct JsonLevelStore {
    dir: PathBuf,
}

impl JsonLevelStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: u32) -> PathBuf {
        self.dir.join(format!("level_{id:04}.json"))
    }

    /// Record ids present on disk, in ascending order
    fn ids(&self) -> Result<Vec<u32>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(id) = name
                .strip_prefix("level_")
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|digits| digits.parse::<u32>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl LevelStore for JsonLevelStore {
    fn save_level(&mut self, level: &LevelSnapshot) -> Result<u32, StoreError> {
        let id = if level.meta().id != 0 {
            level.meta().id
        } else {
            self.ids()?.last().copied().unwrap_or(0) + 1
        };
        let record = level.with_id(id);
        let json = serde_json::to_string_pretty(&record)
            .map_err(|source| StoreError::Corrupt { id, source })?;
        fs::write(self.path_for(id), json)?;
        log::info!("saved level '{}' as record {id}", level.meta().name);
        Ok(id)
    }

    fn load_level(&self, id: u32) -> Result<LevelSnapshot, StoreError> {
        let json = match fs::read_to_string(self.path_for(id)) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(id));
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&json).map_err(|source| StoreError::Corrupt { id, source })
    }

    fn list_levels(&self) -> Result<Vec<LevelMeta>, StoreError> {
        let mut metas = Vec::new();
        for id in self.ids()? {
            match self.load_level(id) {
                Ok(level) => metas.push(level.meta().clone()),
                // A bad record must not hide the rest of the library
                Err(err) => log::warn!("skipping unreadable level {id}: {err}"),
            }
        }
        Ok(metas)
    }
}
