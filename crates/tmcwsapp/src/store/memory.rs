use super::ExerciseStorage;
use crate::error::{Result, TmcError};
use crate::model::ExerciseRecord;
use std::cell::{Cell, RefCell};

/// In-memory storage for testing.
///
/// Uses `RefCell` for interior mutability so that `ExerciseStorage` can take `&self`.
/// Counts saves so tests can assert that every mutation persisted.
#[derive(Default)]
pub struct MemStorage {
    records: RefCell<Vec<ExerciseRecord>>,
    saves: Cell<usize>,
    simulate_write_error: Cell<bool>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with records, as if loaded from a previous session.
    pub fn with_records(records: Vec<ExerciseRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Snapshot of the last saved record set.
    pub fn records(&self) -> Vec<ExerciseRecord> {
        self.records.borrow().clone()
    }
}

impl ExerciseStorage for MemStorage {
    fn load(&self) -> Result<Vec<ExerciseRecord>> {
        Ok(self.records.borrow().clone())
    }

    fn save(&self, records: &[ExerciseRecord]) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(TmcError::Store("Simulated write error".to_string()));
        }
        *self.records.borrow_mut() = records.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
