//! Symbol Remap: namespace-wide symbol renaming for Java source trees
//!
//! Renames classes, fields, methods, parameters and local variables
//! throughout a source tree from an old naming namespace to a new one,
//! driven by mapping tables and a precomputed symbol range map.
//!
//! # Architecture
//!
//! Every rename compiles down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Intelligence lives in the inputs, not in the
//! application logic:
//!
//! - [`mapping`] reads and chains `CL:`/`FD:`/`MD:` mapping tables
//! - [`rename`] flattens them into [`RenameTables`] keyed by [`SymbolKey`]
//! - [`rangemap`] reads where each symbol occurs in each file
//! - [`apply`] rewrites one file at a time, fixing up imports
//! - [`remapper`] runs all of it over a tree
//!
//! # Safety
//!
//! - Every span is checked against the text the range map expects
//! - A run is planned completely in memory before any file is written
//! - Atomic file writes (tempfile + fsync + rename)
//! - Reads, writes and moves stay inside the source root
//!
//! # Example
//!
//! ```
//! use symbol_remap::apply::{Corrections, FileRemapper};
//! use symbol_remap::mapping::MappingSet;
//! use symbol_remap::rangemap::RangeMap;
//! use symbol_remap::rename::RenameTables;
//! use symbol_remap::safety::SourceRoot;
//!
//! let mappings = MappingSet::parse_str("CL: a/Foo b/Bar\n", "inline").unwrap();
//! let tables = RenameTables::from_mappings(&mappings);
//! let ranges = RangeMap::parse_str("@|x/Use.java|0|3|Foo|class|a.Foo\n", &SourceRoot::lexical("/src")).unwrap();
//!
//! let corrections = Corrections::default();
//! let remapped = FileRemapper::new(&tables, &corrections, "a")
//!     .remap("x/Use.java", "Foo f;", ranges.get("x/Use.java").unwrap())
//!     .unwrap();
//! assert_eq!(remapped.content, "import b.Bar;\nBar f;");
//! ```

pub mod apply;
pub mod config;
pub mod edit;
pub mod error;
pub mod key;
pub mod mapping;
pub mod rangemap;
pub mod remapper;
pub mod rename;
pub mod safety;

// Re-exports
pub use apply::{ApplyError, FileRemapper, RemappedFile};
pub use config::{ConfigError, RemapConfig};
pub use edit::{Edit, EditError};
pub use error::{ErrorKind, RemapError};
pub use key::{SymbolKey, SymbolKind};
pub use mapping::{MappingError, MappingSet};
pub use rangemap::{RangeMap, RangeMapError, RangeRecord};
pub use remapper::{Remapper, RunPlan, RunSummary};
pub use rename::{RenameTableBuilder, RenameTables};
pub use safety::{SafetyError, SourceRoot};
