//! Symbol range maps: byte-offset occurrences of symbols in source files.
//!
//! One record per line, `|`-delimited, behind a leading `@` sentinel:
//!
//! ```text
//! @|/src/net/minecraft/server/Block.java|120|125|Block|class|net.minecraft.server.Block
//! @|/src/net/minecraft/server/Block.java|300|301|a|method|net.minecraft.server.Block|a|(I)V
//! @|/src/net/minecraft/server/Block.java|302|303|i|param|net.minecraft.server.Block|a|(I)V|i|0
//! ```
//!
//! Lines without the sentinel are ignored. Class names arrive in source
//! form and are keyed in internal form.

use crate::error::ErrorKind;
use crate::key::{source_to_internal, SymbolKey, SymbolKind};
use crate::safety::SourceRoot;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const SENTINEL: &str = "@";
/// Package records for the file's own `package` statement name no class.
const FILE_PACKAGE: &str = "(file)";
/// Constructor-call tokens; never a rename target.
const SELF_CALL_TOKENS: [&str; 2] = ["this", "super"];

/// One occurrence of a symbol: `[start, end)` must read `expected`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RangeRecord {
    pub start: usize,
    pub end: usize,
    pub expected: String,
    pub key: SymbolKey,
}

impl fmt::Display for RangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}) {:?} = {}",
            self.start, self.end, self.expected, self.key
        )
    }
}

/// A parsed record before grouping, with the file it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root-relative, `/`-separated path
    pub file: String,
    pub record: RangeRecord,
    /// Textual name carried by param/localvar records; not part of the key.
    pub declared_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum RangeMapError {
    #[error("malformed range map line {line}: {message}: {text:?}")]
    Malformed {
        line: usize,
        text: String,
        message: String,
    },

    #[error("range map for {file} has overlapping symbols: {first} and {second}")]
    Overlap {
        file: String,
        first: RangeRecord,
        second: RangeRecord,
    },

    #[error("range map for {file}: expected text of {record} is {actual} bytes long, range covers {span}")]
    LengthMismatch {
        file: String,
        record: RangeRecord,
        actual: usize,
        span: usize,
    },

    #[error("failed to read range map {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

impl RangeMapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RangeMapError::Malformed { .. } => ErrorKind::MalformedInput,
            RangeMapError::Overlap { .. } | RangeMapError::LengthMismatch { .. } => {
                ErrorKind::ConsistencyViolation
            }
            RangeMapError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// The internal name of the top-level class a file must declare: its
/// root-relative path without the extension.
pub fn top_level_class_for_file(file: &str) -> String {
    let without_ext = match file.rfind('.') {
        Some(dot) if !file[dot..].contains('/') => &file[..dot],
        _ => file,
    };
    without_ext.to_string()
}

fn malformed(line: usize, text: &str, message: impl Into<String>) -> RangeMapError {
    RangeMapError::Malformed {
        line,
        text: text.to_string(),
        message: message.into(),
    }
}

fn parse_offset(value: &str, line: usize, text: &str) -> Result<usize, RangeMapError> {
    value
        .parse()
        .map_err(|_| malformed(line, text, format!("invalid offset {value:?}")))
}

fn parse_index(value: &str, line: usize, text: &str) -> Result<usize, RangeMapError> {
    value
        .parse()
        .map_err(|_| malformed(line, text, format!("invalid index {value:?}")))
}

/// Parse every record of a range map without grouping or checking them.
///
/// Records for `this`/`super` tokens are dropped here.
pub fn parse_records(input: &str, root: &SourceRoot) -> Result<Vec<FileRecord>, RangeMapError> {
    let mut records = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let text = raw.trim();
        let tokens: Vec<&str> = text.split('|').collect();
        if tokens.first() != Some(&SENTINEL) {
            continue;
        }
        let [_, file, start, end, expected, kind, info @ ..] = tokens.as_slice() else {
            return Err(malformed(line_no, text, "expected at least six fields"));
        };

        let file = root.relativize(file);
        let start = parse_offset(start, line_no, text)?;
        let end = parse_offset(end, line_no, text)?;
        let kind = SymbolKind::parse(kind)
            .ok_or_else(|| malformed(line_no, text, format!("unknown kind {kind:?}")))?;

        let mut declared_name = None;
        let key = match (kind, info) {
            (SymbolKind::Package, [_package, for_class]) => {
                if *for_class == FILE_PACKAGE {
                    SymbolKey::package(top_level_class_for_file(&file))
                } else {
                    SymbolKey::package(source_to_internal(for_class))
                }
            }
            (SymbolKind::Class, [class]) => SymbolKey::class(source_to_internal(class)),
            (SymbolKind::Field, [class, name]) => {
                SymbolKey::field(source_to_internal(class), *name)
            }
            (SymbolKind::Method, [class, name, signature]) => {
                SymbolKey::method(source_to_internal(class), *name, *signature)
            }
            (SymbolKind::Param, [class, method, signature, name, position]) => {
                declared_name = Some(name.to_string());
                let position = parse_index(position, line_no, text)?;
                SymbolKey::param(source_to_internal(class), *method, *signature, position)
            }
            (SymbolKind::LocalVar, [class, method, signature, name, position]) => {
                declared_name = Some(name.to_string());
                let position = parse_index(position, line_no, text)?;
                SymbolKey::local_var(source_to_internal(class), *method, *signature, position)
            }
            (kind, _) => {
                return Err(malformed(
                    line_no,
                    text,
                    format!("wrong number of fields for {kind} record"),
                ));
            }
        };

        if SELF_CALL_TOKENS.contains(expected) {
            continue;
        }

        records.push(FileRecord {
            file,
            record: RangeRecord {
                start,
                end,
                expected: expected.to_string(),
                key,
            },
            declared_name,
        });
    }

    Ok(records)
}

/// Read and parse a range map file without grouping it.
pub fn load_records(
    path: impl AsRef<Path>,
    root: &SourceRoot,
) -> Result<Vec<FileRecord>, RangeMapError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| RangeMapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&contents, root)
}

/// Per-file record lists: sorted by start, deduplicated, non-overlapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeMap {
    files: BTreeMap<String, Vec<RangeRecord>>,
}

impl RangeMap {
    pub fn parse_str(input: &str, root: &SourceRoot) -> Result<Self, RangeMapError> {
        Self::from_records(parse_records(input, root)?)
    }

    pub fn load(path: impl AsRef<Path>, root: &SourceRoot) -> Result<Self, RangeMapError> {
        Self::from_records(load_records(path, root)?)
    }

    /// Group records by file and check each file's list.
    pub fn from_records(records: Vec<FileRecord>) -> Result<Self, RangeMapError> {
        let mut files: BTreeMap<String, Vec<RangeRecord>> = BTreeMap::new();
        for FileRecord { file, record, .. } in records {
            files.entry(file).or_default().push(record);
        }
        for (file, list) in files.iter_mut() {
            sort_range_list(file, list)?;
        }
        Ok(Self { files })
    }

    /// Files in lexicographic order of their relative path.
    pub fn files(&self) -> impl Iterator<Item = (&str, &[RangeRecord])> {
        self.files
            .iter()
            .map(|(file, records)| (file.as_str(), records.as_slice()))
    }

    pub fn get(&self, file: &str) -> Option<&[RangeRecord]> {
        self.files.get(file).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Sort ascending by start, drop exact duplicates, and verify that no two
/// records overlap and every record's span matches its text.
pub fn sort_range_list(file: &str, list: &mut Vec<RangeRecord>) -> Result<(), RangeMapError> {
    list.sort();
    list.dedup();

    for record in list.iter() {
        let span = record.end.checked_sub(record.start);
        if span != Some(record.expected.len()) {
            return Err(RangeMapError::LengthMismatch {
                file: file.to_string(),
                record: record.clone(),
                actual: record.expected.len(),
                span: span.unwrap_or(0),
            });
        }
    }

    for pair in list.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if second.start < first.end || second.start == first.start {
            return Err(RangeMapError::Overlap {
                file: file.to_string(),
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    Ok(())
}
