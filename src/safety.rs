use crate::error::ErrorKind;
use crate::key::SEP;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// The source root a run operates on.
///
/// Range maps identify files by absolute path; everything else in a run
/// works with `/`-separated paths relative to this root, which double as
/// the internal names of the files' top-level classes. All reads, writes
/// and relocations are resolved through here so they cannot leave the root.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    /// Root as configured
    root: PathBuf,
    /// Canonical form, when the root exists on disk
    canonical: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path escapes the source root: {path} (root: {root})")]
    OutsideRoot { path: String, root: PathBuf },

    #[error("Failed to canonicalize source root {}: {source}", root.display())]
    Canonicalize {
        root: PathBuf,
        source: std::io::Error,
    },
}

impl SafetyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SafetyError::OutsideRoot { .. } => ErrorKind::ConsistencyViolation,
            SafetyError::Canonicalize { .. } => ErrorKind::Io,
        }
    }
}

impl SourceRoot {
    /// Open an existing source root. The root is canonicalized so that
    /// symlinked checkouts relativize the same way as their targets.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref().to_path_buf();
        let canonical = root
            .canonicalize()
            .map_err(|source| SafetyError::Canonicalize {
                root: root.clone(),
                source,
            })?;
        Ok(Self {
            root,
            canonical: Some(canonical),
        })
    }

    /// A root that is only used lexically and need not exist.
    pub fn lexical(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            canonical: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Turn a file name from a range map into a root-relative, `/`-separated path.
    ///
    /// Relative names are taken as already relative. Absolute names outside
    /// the root are kept unchanged; they will simply not match any file.
    pub fn relativize(&self, file: &str) -> String {
        let normalized = file.replace('\\', "/");
        let path = Path::new(&normalized);
        if !path.is_absolute() {
            return normalized;
        }

        let relative = std::iter::once(self.root.as_path())
            .chain(self.canonical.as_deref())
            .find_map(|root| path.strip_prefix(root).ok());

        match relative {
            Some(relative) => join_components(relative),
            None => {
                log::warn!(
                    "{} is not under source root {}",
                    file,
                    self.root.display()
                );
                normalized
            }
        }
    }

    /// Resolve a root-relative path to a path on disk, refusing anything
    /// that would leave the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SafetyError> {
        let path = Path::new(relative);
        let escapes = path.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes {
            return Err(SafetyError::OutsideRoot {
                path: relative.to_string(),
                root: self.root.clone(),
            });
        }
        Ok(self.root.join(path))
    }
}

fn join_components(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(&SEP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_relativize_absolute_inside_root() {
        let root = SourceRoot::lexical("/work/src/main/java");
        assert_eq!(
            root.relativize("/work/src/main/java/net/minecraft/server/Block.java"),
            "net/minecraft/server/Block.java"
        );
    }

    #[test]
    fn test_relativize_keeps_relative_names() {
        let root = SourceRoot::lexical("/work");
        assert_eq!(root.relativize("a/b/C.java"), "a/b/C.java");
        assert_eq!(root.relativize("a\\b\\C.java"), "a/b/C.java");
    }

    #[test]
    fn test_relativize_outside_root_unchanged() {
        let root = SourceRoot::lexical("/work/src");
        assert_eq!(root.relativize("/elsewhere/C.java"), "/elsewhere/C.java");
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let root = SourceRoot::lexical("/work/src");
        assert!(root.resolve("a/B.java").is_ok());
        let err = root.resolve("../B.java").unwrap_err();
        assert!(matches!(err, SafetyError::OutsideRoot { .. }));
        assert!(root.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_new_requires_existing_root() {
        assert!(matches!(
            SourceRoot::new("/definitely/not/a/root"),
            Err(SafetyError::Canonicalize { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_relativize_through_symlinked_root() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir_all(real.join("a")).unwrap();
        let link = temp_dir.path().join("link");
        symlink(&real, &link).unwrap();

        let root = SourceRoot::new(&link).unwrap();
        let canonical_file = real.canonicalize().unwrap().join("a/B.java");
        assert_eq!(root.relativize(&canonical_file.to_string_lossy()), "a/B.java");
    }
}
