//! Descriptive names for indexed placeholder identifiers.
//!
//! Placeholder members carry generated names such as `field_70170_p` or
//! `func_70071_h_`. Comma-separated tables map them to human-chosen names:
//!
//! ```text
//! searge,name,side,desc
//! field_70170_p,worldObj,2,Reference to the World object.
//! ```
//!
//! Side `0` marks client-only rows, which are never loaded.

use super::errors::{read_input, MappingError};
use crate::key::SEP;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_FIELD_PREFIX: &str = "field_";
pub const DEFAULT_METHOD_PREFIX: &str = "func_";

const CLIENT_ONLY_SIDE: &str = "0";

/// Overlay turning indexed field/method ids into descriptive names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptiveNames {
    field_prefix: String,
    method_prefix: String,
    fields: BTreeMap<String, String>,
    methods: BTreeMap<String, String>,
}

impl Default for DescriptiveNames {
    fn default() -> Self {
        Self::new(BTreeMap::new(), BTreeMap::new())
    }
}

impl DescriptiveNames {
    pub fn new(fields: BTreeMap<String, String>, methods: BTreeMap<String, String>) -> Self {
        Self {
            field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
            fields,
            methods,
        }
    }

    /// Use different placeholder prefixes. The two prefixes must not overlap.
    pub fn with_prefixes(mut self, field_prefix: &str, method_prefix: &str) -> Self {
        self.field_prefix = field_prefix.to_string();
        self.method_prefix = method_prefix.to_string();
        self
    }

    pub fn from_csv(fields_csv: &str, methods_csv: &str) -> Result<Self, MappingError> {
        Ok(Self::new(
            parse_descriptive_csv(fields_csv, "fields.csv")?,
            parse_descriptive_csv(methods_csv, "methods.csv")?,
        ))
    }

    pub fn load(fields: impl AsRef<Path>, methods: impl AsRef<Path>) -> Result<Self, MappingError> {
        let (fields, methods) = (fields.as_ref(), methods.as_ref());
        Ok(Self::new(
            parse_descriptive_csv(&read_input(fields)?, &fields.display().to_string())?,
            parse_descriptive_csv(&read_input(methods)?, &methods.display().to_string())?,
        ))
    }

    /// Load `fields.csv` and `methods.csv` from a configuration directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, MappingError> {
        let dir = dir.as_ref();
        Self::load(dir.join("fields.csv"), dir.join("methods.csv"))
    }

    /// Translate a bare leaf identifier; names matching neither prefix pass through.
    pub fn describe_leaf<'a>(&'a self, leaf: &'a str) -> &'a str {
        let table = if leaf.starts_with(&self.field_prefix) {
            &self.fields
        } else if leaf.starts_with(&self.method_prefix) {
            &self.methods
        } else {
            return leaf;
        };
        table.get(leaf).map_or(leaf, String::as_str)
    }

    /// Translate the leaf of a qualified internal name, keeping its path.
    pub fn describe(&self, qualified: &str) -> String {
        match qualified.rsplit_once(SEP) {
            Some((path, leaf)) => format!("{path}{SEP}{}", self.describe_leaf(leaf)),
            None => self.describe_leaf(qualified).to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }
}

/// Parse `(indexedId, descriptiveName, side, description)` rows, header skipped.
pub fn parse_descriptive_csv(
    input: &str,
    origin: &str,
) -> Result<BTreeMap<String, String>, MappingError> {
    let mut names = BTreeMap::new();

    for (index, line) in input.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.splitn(4, ',').collect();
        let [indexed, name, side, ..] = columns.as_slice() else {
            return Err(MappingError::malformed(
                origin,
                index + 1,
                line,
                "expected indexed id, name and side columns",
            ));
        };
        if side.trim() == CLIENT_ONLY_SIDE {
            continue;
        }
        names.insert(indexed.trim().to_string(), name.trim().to_string());
    }

    Ok(names)
}

/// Parse a two-column `key,value` table, header skipped.
pub fn parse_csv_map(input: &str, origin: &str) -> Result<BTreeMap<String, String>, MappingError> {
    let mut map = BTreeMap::new();

    for (index, line) in input.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split(',');
        match (columns.next(), columns.next()) {
            (Some(key), Some(value)) => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                return Err(MappingError::malformed(
                    origin,
                    index + 1,
                    line,
                    "expected at least two columns",
                ));
            }
        }
    }

    Ok(map)
}

pub fn load_csv_map(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>, MappingError> {
    let path = path.as_ref();
    parse_csv_map(&read_input(path)?, &path.display().to_string())
}
