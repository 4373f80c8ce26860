//! Fixture directory checks.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{TerraformError, TerraformResult};

/// Verify that a configuration directory exists and actually contains
/// terraform declarations. Operations call this before spawning terraform
/// so a bad fixture path fails immediately instead of after an init.
pub fn check(dir: &Path) -> TerraformResult<()> {
    if !dir.is_dir() {
        return Err(TerraformError::MissingFixture(dir.to_path_buf()));
    }
    if declaration_files(dir)?.is_empty() {
        return Err(TerraformError::EmptyFixture(dir.to_path_buf()));
    }
    Ok(())
}

/// List the terraform declaration files under a directory, skipping the
/// `.terraform` working directory.
pub fn declaration_files(dir: &Path) -> TerraformResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".terraform")
    {
        let entry = entry.map_err(|e| {
            TerraformError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "walk failed")
            }))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".tf") || name.ends_with(".tf.json") {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_directory() {
        let err = check(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, TerraformError::MissingFixture(_)));
    }

    #[test]
    fn test_directory_without_declarations() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "not terraform").unwrap();

        let err = check(dir.path()).unwrap_err();
        assert!(matches!(err, TerraformError::EmptyFixture(_)));
    }

    #[test]
    fn test_finds_nested_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let module_dir = dir.path().join("modules/vpc");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(dir.path().join("main.tf"), "module \"vpc\" {}").unwrap();
        fs::write(module_dir.join("main.tf"), "resource \"null_resource\" \"n\" {}").unwrap();

        check(dir.path()).unwrap();
        assert_eq!(declaration_files(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_skips_terraform_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let tf_dir = dir.path().join(".terraform/modules");
        fs::create_dir_all(&tf_dir).unwrap();
        fs::write(tf_dir.join("cached.tf"), "").unwrap();
        fs::write(dir.path().join("main.tf"), "").unwrap();

        let files = declaration_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.tf"));
    }
}
