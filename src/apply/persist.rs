use super::{ApplyError, RemappedFile};
use crate::edit::atomic_write;
use crate::safety::SourceRoot;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What to do with a remapped file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOptions {
    /// Write the new contents back
    pub rewrite: bool,
    /// Move files whose top-level class changed package or name
    pub relocate: bool,
    /// Version-control command used for moves; empty to always move directly
    pub git: String,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            rewrite: true,
            relocate: true,
            git: "git".to_string(),
        }
    }
}

/// Write `remapped` under `root` and move it if its class moved.
///
/// Returns the path the file ends up at.
pub fn persist(
    root: &SourceRoot,
    remapped: &RemappedFile,
    options: &PersistOptions,
) -> Result<PathBuf, ApplyError> {
    let path = root.resolve(&remapped.file)?;

    if options.rewrite && remapped.content != remapped.original {
        atomic_write(&path, remapped.content.as_bytes()).map_err(|source| ApplyError::Io {
            path: path.clone(),
            source,
        })?;
    }

    match (&remapped.relocation, options.relocate) {
        (Some(target), true) => relocate(root, &remapped.file, target, &options.git),
        _ => Ok(path),
    }
}

fn relocate(root: &SourceRoot, from: &str, to: &str, git: &str) -> Result<PathBuf, ApplyError> {
    let source = root.resolve(from)?;
    let target = root.resolve(to)?;
    // planning already refused occupied destinations; the tree may have changed since
    if target.exists() {
        return Err(ApplyError::RelocationConflict {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| ApplyError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    log::info!("Moving {from} to {to}");
    if !git.is_empty() && git_move(root.path(), git, from, to) {
        return Ok(target);
    }

    fs::rename(&source, &target).map_err(|source_err| ApplyError::Io {
        path: source.clone(),
        source: source_err,
    })?;
    Ok(target)
}

/// Try a history-preserving move; false if the command is missing or fails.
fn git_move(root: &Path, git: &str, from: &str, to: &str) -> bool {
    match Command::new(git)
        .arg("mv")
        .arg(from)
        .arg(to)
        .current_dir(root)
        .output()
    {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            log::warn!(
                "{git} mv {from} {to} failed ({}); moving without history",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            log::warn!("Could not run {git}: {e}; moving without history");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn remapped(file: &str, relocation: Option<&str>) -> RemappedFile {
        RemappedFile {
            file: file.to_string(),
            original: "class Foo {}".to_string(),
            content: "class Bar {}".to_string(),
            relocation: relocation.map(str::to_string),
            renamed: 1,
            imports_added: Vec::new(),
            normalized_line_endings: false,
        }
    }

    fn no_git() -> PersistOptions {
        PersistOptions {
            git: String::new(),
            ..PersistOptions::default()
        }
    }

    #[test]
    fn test_rewrite_and_relocate() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a")).unwrap();
        fs::write(temp_dir.path().join("a/Foo.java"), "class Foo {}").unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();

        let path = persist(&root, &remapped("a/Foo.java", Some("b/Bar.java")), &no_git()).unwrap();

        assert_eq!(path, temp_dir.path().join("b/Bar.java"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "class Bar {}");
        assert!(!temp_dir.path().join("a/Foo.java").exists());
    }

    #[test]
    fn test_failing_vcs_falls_back_to_rename() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Foo.java"), "class Foo {}").unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let options = PersistOptions {
            git: "definitely-not-a-vcs-binary".to_string(),
            ..PersistOptions::default()
        };

        let path = persist(&root, &remapped("Foo.java", Some("Bar.java")), &options).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rewrite_disabled() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Foo.java"), "class Foo {}").unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let options = PersistOptions {
            rewrite: false,
            relocate: false,
            ..no_git()
        };

        let path = persist(&root, &remapped("Foo.java", Some("Bar.java")), &options).unwrap();
        assert_eq!(path, temp_dir.path().join("Foo.java"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "class Foo {}");
    }

    #[test]
    fn test_relocation_conflict() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Foo.java"), "class Foo {}").unwrap();
        fs::write(temp_dir.path().join("Bar.java"), "class Bar {}").unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();

        let err = persist(&root, &remapped("Foo.java", Some("Bar.java")), &no_git()).unwrap_err();
        assert!(matches!(err, ApplyError::RelocationConflict { .. }));
    }

    #[test]
    fn test_relocation_outside_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Foo.java"), "class Foo {}").unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();

        let err = persist(&root, &remapped("Foo.java", Some("../Bar.java")), &no_git()).unwrap_err();
        assert!(matches!(err, ApplyError::Safety(_)));
    }
}
