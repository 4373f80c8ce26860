//! Isolated fixture copies for parallel test runs.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{HarnessError, HarnessResult};

/// Files and directories that must not travel with a fixture copy: local
/// state would make two test runs stomp on each other, which is the whole
/// reason for copying.
fn is_state_artifact(name: &str) -> bool {
    name == ".terraform"
        || name == ".terraform.lock.hcl"
        || name == "terraform.tfstate"
        || name == "terraform.tfstate.backup"
        || name.ends_with(".tfstate")
}

/// A private copy of a fixture directory inside a temp dir.
///
/// The Rust test runner executes tests in parallel by default; two tests
/// applying the same fixture directory would share terraform state and
/// lock files. Each test copies the fixture instead and runs against its
/// own copy, which is removed when the workspace is dropped.
pub struct FixtureWorkspace {
    root: TempDir,
    dir: PathBuf,
}

impl FixtureWorkspace {
    /// Copy a fixture directory into a fresh temp dir.
    pub fn copy_from(fixture: impl AsRef<Path>) -> HarnessResult<Self> {
        let fixture = fixture.as_ref();
        if !fixture.is_dir() {
            return Err(HarnessError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("fixture directory not found: {}", fixture.display()),
            )));
        }

        let root = TempDir::new()?;
        let name = fixture
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "fixture".to_string());
        let dir = root.path().join(name);

        let mut copied = 0usize;
        for entry in WalkDir::new(fixture).into_iter().filter_entry(|e| {
            !is_state_artifact(&e.file_name().to_string_lossy())
        }) {
            let entry = entry.map_err(|e| {
                HarnessError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walk failed")
                }))
            })?;

            let relative = entry
                .path()
                .strip_prefix(fixture)
                .expect("walked path is under the fixture root");
            let destination = dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&destination)?;
            } else if entry.file_type().is_file() {
                if let Some(parent) = destination.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &destination)?;
                copied += 1;
            }
        }

        debug!(
            "Copied {} file(s) from {} to {}",
            copied,
            fixture.display(),
            dir.display()
        );

        Ok(Self { root, dir })
    }

    /// Path of the private fixture copy.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Give up ownership of the temp dir, leaving the copy on disk.
    pub fn into_path(self) -> PathBuf {
        let _ = self.root.into_path();
        self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tf"), "module \"vpc\" {}").unwrap();
        fs::create_dir_all(dir.path().join("modules/vpc")).unwrap();
        fs::write(dir.path().join("modules/vpc/main.tf"), "").unwrap();

        // Local state that must not leak into copies.
        fs::create_dir_all(dir.path().join(".terraform/providers")).unwrap();
        fs::write(dir.path().join(".terraform/providers/cached"), "").unwrap();
        fs::write(dir.path().join("terraform.tfstate"), "{}").unwrap();
        fs::write(dir.path().join(".terraform.lock.hcl"), "").unwrap();
        dir
    }

    #[test]
    fn test_copy_preserves_declarations() {
        let fixture = build_fixture();
        let workspace = FixtureWorkspace::copy_from(fixture.path()).unwrap();

        assert!(workspace.path().join("main.tf").exists());
        assert!(workspace.path().join("modules/vpc/main.tf").exists());
    }

    #[test]
    fn test_copy_excludes_state() {
        let fixture = build_fixture();
        let workspace = FixtureWorkspace::copy_from(fixture.path()).unwrap();

        assert!(!workspace.path().join(".terraform").exists());
        assert!(!workspace.path().join("terraform.tfstate").exists());
        assert!(!workspace.path().join(".terraform.lock.hcl").exists());
    }

    #[test]
    fn test_copies_are_independent() {
        let fixture = build_fixture();
        let first = FixtureWorkspace::copy_from(fixture.path()).unwrap();
        let second = FixtureWorkspace::copy_from(fixture.path()).unwrap();

        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_missing_fixture_is_an_error() {
        assert!(FixtureWorkspace::copy_from("/definitely/not/here").is_err());
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let fixture = build_fixture();
        let workspace = FixtureWorkspace::copy_from(fixture.path()).unwrap();
        let path = workspace.path().to_path_buf();

        drop(workspace);
        assert!(!path.exists());
    }
}
