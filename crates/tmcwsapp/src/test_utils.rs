use crate::index::ExerciseIndex;
use crate::paths::WorkspacePaths;
use crate::store::memory::MemStorage;
use crate::workspace::Workspace;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub paths: WorkspacePaths,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let paths = WorkspacePaths::new(root.join("exercises"), root.join("closed"));
        fs::create_dir_all(&paths.exercises_root).expect("failed to create exercises root");
        Self {
            _temp_dir: temp_dir,
            paths,
            root,
        }
    }

    pub fn index(&self) -> ExerciseIndex<MemStorage> {
        ExerciseIndex::load(MemStorage::new(), self.paths.clone()).expect("failed to load index")
    }

    pub fn workspace(&self) -> Workspace<MemStorage> {
        Workspace::new(self.index())
    }

    /// Writes downloaded content into a staging folder.
    pub fn stage(&self, staging: &Path) {
        fs::create_dir_all(staging.join("src")).expect("failed to stage exercise");
        fs::write(staging.join("README.md"), "# exercise\n").expect("failed to stage exercise");
        fs::write(staging.join("src/Main.java"), "class Main {}\n")
            .expect("failed to stage exercise");
    }
}
