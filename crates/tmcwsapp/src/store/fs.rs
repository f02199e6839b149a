use super::{ExerciseStorage, STORAGE_VERSION};
use crate::error::{Result, TmcError};
use crate::model::ExerciseRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct StoredExercises {
    version: u32,
    exercises: Vec<ExerciseRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFile {
    Versioned(StoredExercises),
    Legacy(Vec<ExerciseRecord>),
}

pub struct JsonStorage {
    file: PathBuf,
}

impl JsonStorage {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

impl ExerciseStorage for JsonStorage {
    fn load(&self) -> Result<Vec<ExerciseRecord>> {
        if !self.file.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.file).map_err(TmcError::Io)?;
        let stored: StoredFile = serde_json::from_str(&content).map_err(TmcError::Serialization)?;

        match stored {
            StoredFile::Versioned(stored) if stored.version > STORAGE_VERSION => {
                Err(TmcError::UnsupportedState(format!(
                    "storage version {} is newer than supported version {}",
                    stored.version, STORAGE_VERSION
                )))
            }
            StoredFile::Versioned(stored) => Ok(stored.exercises),
            StoredFile::Legacy(records) => {
                tracing::info!(
                    file = %self.file.display(),
                    count = records.len(),
                    "migrating legacy exercise data"
                );
                Ok(records)
            }
        }
    }

    fn save(&self, records: &[ExerciseRecord]) -> Result<()> {
        let dir = self
            .file
            .parent()
            .ok_or_else(|| TmcError::Store(format!("{} has no parent", self.file.display())))?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(TmcError::Io)?;
        }

        let stored = StoredExercises {
            version: STORAGE_VERSION,
            exercises: records.to_vec(),
        };
        let content = serde_json::to_string_pretty(&stored).map_err(TmcError::Serialization)?;

        // Atomic write
        let tmp_file = dir.join(format!(".exercises-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(TmcError::Io)?;
        fs::rename(&tmp_file, &self.file).map_err(TmcError::Io)?;

        Ok(())
    }
}
