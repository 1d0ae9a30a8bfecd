//! The rename applier: turns one file's range records into rewritten text.
//!
//! [`FileRemapper::remap`] is pure; it takes the file contents and returns
//! the new contents plus where the file should live afterwards. Writing and
//! moving files is left to [`persist`].

pub mod corrections;
pub mod imports;
pub mod persist;

pub use corrections::{Correction, Corrections};
pub use imports::update_imports;
pub use persist::{persist, PersistOptions};

use crate::edit::{shift_offset, Edit, EditError};
use crate::error::ErrorKind;
use crate::key::{internal_to_source, source_to_internal, split_base_name, split_package_name, SymbolKey, SymbolKind};
use crate::rangemap::{top_level_class_for_file, RangeRecord};
use crate::rename::{RenameTables, Resolution};
use crate::safety::SafetyError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error(
        "{file}: text at [{start}, {end}) (shift {shift}) is {found:?}, range map expects {expected:?}; \
         the range map is stale or does not match this tree"
    )]
    TextMismatch {
        file: String,
        start: usize,
        end: usize,
        shift: isize,
        expected: String,
        /// `None` when the shifted span is outside the text
        found: Option<String>,
    },

    #[error("{file}: top-level class {class} has a new package ({package:?}) and class name ({class_name:?}) that do not agree")]
    IncoherentTopLevel {
        file: String,
        class: String,
        package: Option<String>,
        class_name: Option<String>,
    },

    #[error("{file}: {key} is renamed to the empty string, which only package qualifiers may be")]
    EmptyRename { file: String, key: SymbolKey },

    #[error("Cannot relocate {from} to {to}: destination exists")]
    RelocationConflict { from: String, to: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

impl ApplyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplyError::TextMismatch { .. }
            | ApplyError::IncoherentTopLevel { .. }
            | ApplyError::EmptyRename { .. }
            | ApplyError::RelocationConflict { .. } => ErrorKind::ConsistencyViolation,
            ApplyError::Io { .. } => ErrorKind::Io,
            ApplyError::Safety(e) => e.kind(),
        }
    }
}

/// The outcome of remapping one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedFile {
    /// Root-relative path the file was read from
    pub file: String,
    pub original: String,
    pub content: String,
    /// Root-relative path the file belongs at, when its top-level class moved
    pub relocation: Option<String>,
    /// Occurrences replaced
    pub renamed: usize,
    /// Import lines inserted, as fully-qualified class names
    pub imports_added: Vec<String>,
    /// Whether carriage returns were stripped before editing
    pub normalized_line_endings: bool,
}

impl RemappedFile {
    pub fn is_changed(&self) -> bool {
        self.content != self.original || self.relocation.is_some()
    }
}

/// Applies one set of rename tables to files.
#[derive(Debug, Clone, Copy)]
pub struct FileRemapper<'a> {
    tables: &'a RenameTables,
    corrections: &'a Corrections,
    /// Renamed namespace, internal form; empty for none
    namespace: &'a str,
    annotate: bool,
}

impl<'a> FileRemapper<'a> {
    pub fn new(tables: &'a RenameTables, corrections: &'a Corrections, namespace: &'a str) -> Self {
        Self {
            tables,
            corrections,
            namespace,
            annotate: false,
        }
    }

    /// Keep the original text next to each replacement as a `/*was:...*/`
    /// comment. Deleted qualifiers are not annotated.
    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Rewrite `source` (the contents of root-relative `file`) according to
    /// its range records, which must be sorted and non-overlapping.
    ///
    /// Offsets in the records describe the pristine file; every earlier
    /// replacement moves later spans by its change in length. Each span is
    /// checked against the text the record expects before anything is
    /// replaced, and a mismatch fails the whole file.
    pub fn remap(
        &self,
        file: &str,
        source: &str,
        records: &[RangeRecord],
    ) -> Result<RemappedFile, ApplyError> {
        let normalized_line_endings = source.contains('\r');
        let mut text = if normalized_line_endings {
            log::warn!("{file}: stripping carriage returns; the range map assumes LF line endings");
            source.replace('\r', "")
        } else {
            source.to_string()
        };

        let old_class = top_level_class_for_file(file);
        let new_package = self.tables.get(&SymbolKey::package(old_class.as_str()));
        let new_class = self.tables.get(&SymbolKey::class(old_class.as_str()));
        if new_package.is_some() != new_class.is_some() {
            return Err(ApplyError::IncoherentTopLevel {
                file: file.to_string(),
                class: old_class,
                package: new_package.map(str::to_string),
                class_name: new_class.map(str::to_string),
            });
        }

        // packages compared in internal form
        let file_package = match new_package {
            Some(package) => source_to_internal(package),
            None => split_package_name(&old_class).to_string(),
        };

        let mut shift: isize = 0;
        let mut renamed = 0;
        let mut required_imports = BTreeSet::new();

        for record in records {
            let direct = self.tables.get(&record.key);
            let deletes_qualifier = direct == Some("");
            if deletes_qualifier && record.key.kind() != SymbolKind::Package {
                return Err(ApplyError::EmptyRename {
                    file: file.to_string(),
                    key: record.key.clone(),
                });
            }

            // a deleted qualifier takes its trailing separator with it
            let (end, expected) = if deletes_qualifier {
                (record.end + 1, format!("{}.", record.expected))
            } else {
                (record.end, record.expected.clone())
            };

            let shift_before = shift;
            let mismatch = |found: Option<String>| ApplyError::TextMismatch {
                file: file.to_string(),
                start: record.start,
                end,
                shift: shift_before,
                expected: expected.clone(),
                found,
            };
            let (Some(start_at), Some(end_at)) =
                (shift_offset(record.start, shift), shift_offset(end, shift))
            else {
                return Err(mismatch(None));
            };

            let mut edit = Edit::new(start_at, end_at, String::new(), expected.as_str());
            match edit.validate(&text) {
                Ok(_) => {}
                Err(EditError::BeforeTextMismatch { found, .. }) => return Err(mismatch(Some(found))),
                Err(EditError::InvalidByteRange { .. }) => return Err(mismatch(None)),
            }

            let Some(resolution) = self.tables.resolve(&record.key) else {
                if record.key.is_within(self.namespace) {
                    log::debug!("{file}: no rename for {}", record.key);
                }
                continue;
            };
            if let Resolution::Constructor(name) = resolution {
                log::debug!("{file}: constructor {} -> {name}", record.key);
            }

            if let Some(import) = self.tables.import_for(&record.key) {
                if split_package_name(&source_to_internal(import)) != file_package {
                    required_imports.insert(import.to_string());
                }
            }

            let name = resolution.name();
            edit.new_text = if self.annotate && !deletes_qualifier {
                format!("{name}/*was:{expected}*/")
            } else {
                name.to_string()
            };
            log::debug!("{file}: {} {expected:?} -> {:?}", record.key, edit.new_text);

            shift += edit.apply_to(&mut text).map_err(|e| match e {
                EditError::BeforeTextMismatch { found, .. } => mismatch(Some(found)),
                EditError::InvalidByteRange { .. } => mismatch(None),
            })?;
            renamed += 1;
        }

        if renamed > 0 {
            log::info!("{file}: renamed {renamed} symbols");
        }

        let text = update_imports(
            &text,
            &required_imports,
            self.tables,
            &internal_to_source(self.namespace),
        );
        let content = self.corrections.apply(&text);

        let relocation = match (new_package, new_class) {
            (Some(package), Some(class)) => {
                relocation_target(file, &source_to_internal(package), class)
            }
            _ => None,
        };

        Ok(RemappedFile {
            file: file.to_string(),
            original: source.to_string(),
            content,
            relocation,
            renamed,
            imports_added: required_imports.into_iter().collect(),
            normalized_line_endings,
        })
    }
}

/// The root-relative path for a file whose top-level class is now
/// `package/class`, keeping its extension; `None` if unchanged.
fn relocation_target(file: &str, package: &str, class: &str) -> Option<String> {
    let class = split_base_name(&source_to_internal(class)).to_string();
    let extension = file
        .rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .map(|(_, ext)| ext);
    let name = match extension {
        Some(ext) => format!("{class}.{ext}"),
        None => class,
    };
    let target = if package.is_empty() {
        name
    } else {
        format!("{package}/{name}")
    };
    (target != file).then_some(target)
}
