//! # Storage Layer
//!
//! The exercise index keeps its authoritative state in memory and treats storage as a plain
//! load/save collaborator: [`ExerciseStorage::load`] once at construction, and
//! [`ExerciseStorage::save`] with the **full** record set after every mutation. Nothing else
//! about the storage engine is assumed.
//!
//! ## Implementations
//!
//! - [`fs::JsonStorage`]: Production implementation, a single `exercises.json` file written
//!   atomically (tmp file + rename).
//! - [`memory::MemStorage`]: For testing index logic without a storage file.
//!
//! ## File Format
//!
//! ```text
//! { "version": 1, "exercises": [ { "id": 1, "name": ..., "status": "open", ... } ] }
//! ```
//!
//! Version 0 files are a bare JSON array of records with integer statuses. They are read
//! transparently and rewritten in the current format on the next save.

use crate::error::Result;
use crate::model::ExerciseRecord;

pub mod fs;
pub mod memory;

/// Current on-disk format version written by [`fs::JsonStorage`].
pub const STORAGE_VERSION: u32 = 1;

/// Persistence contract consumed by [`crate::index::ExerciseIndex`].
pub trait ExerciseStorage {
    /// Load every persisted record. An absent store is an empty list, not an error.
    fn load(&self) -> Result<Vec<ExerciseRecord>>;

    /// Replace the persisted record set.
    fn save(&self, records: &[ExerciseRecord]) -> Result<()>;
}
