//! SRG mapping files: `PK:`, `CL:`, `FD:` and `MD:` lines.
//!
//! ```text
//! CL: net/minecraft/server/Block net/minecraft/block/Block
//! FD: net/minecraft/server/Block/a net/minecraft/block/Block/field_149771_c
//! MD: net/minecraft/server/Block/a (I)V net/minecraft/block/Block/func_149672_a (I)V
//! ```
//!
//! Package lines are checked for shape but not kept; a class's package is
//! always derived from its class mapping.

use super::errors::{read_input, MappingError};
use crate::key::split_member;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Mapping files searched for in a conf directory, in order.
pub const CONF_MAPPINGS: [&str; 2] = ["packaged.srg", "server.srg"];

/// A method identity: fully-qualified internal name plus descriptor.
///
/// Methods overload, so the name alone never identifies one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodDescriptor {
    /// `owner/name`, e.g. `net/minecraft/server/Block/a`
    pub name: String,
    /// JVM method descriptor, e.g. `(ILnet/minecraft/server/World;)V`
    pub signature: String,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
        }
    }

    pub fn class(&self) -> &str {
        split_member(&self.name).0
    }

    pub fn simple_name(&self) -> &str {
        split_member(&self.name).1
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.signature)
    }
}

/// One axis of a mapping: old → new, with the inverse kept in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable<K> {
    forward: BTreeMap<K, K>,
    inverse: BTreeMap<K, K>,
}

impl<K> Default for NameTable<K> {
    fn default() -> Self {
        Self {
            forward: BTreeMap::new(),
            inverse: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> NameTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `old → new`. A later insert for the same `old` replaces the earlier one.
    pub fn insert(&mut self, old: K, new: K) {
        if let Some(previous) = self.forward.insert(old.clone(), new.clone()) {
            if self.inverse.get(&previous) == Some(&old) {
                self.inverse.remove(&previous);
            }
        }
        self.inverse.insert(new, old);
    }

    pub fn get(&self, old: &K) -> Option<&K> {
        self.forward.get(old)
    }

    pub fn get_inverse(&self, new: &K) -> Option<&K> {
        self.inverse.get(new)
    }

    pub fn forward(&self) -> &BTreeMap<K, K> {
        &self.forward
    }

    pub fn inverse(&self) -> &BTreeMap<K, K> {
        &self.inverse
    }

    pub fn contains(&self, old: &K) -> bool {
        self.forward.contains_key(old)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entries in ascending order of the old name.
    pub fn iter(&self) -> btree_map::Iter<'_, K, K> {
        self.forward.iter()
    }

    /// Layer `other` on top of `self`; `other` wins on collisions.
    pub fn extend(&mut self, other: &NameTable<K>) {
        for (old, new) in other.iter() {
            self.insert(old.clone(), new.clone());
        }
    }

    /// Swap directions: the result maps new → old.
    pub fn reversed(&self) -> Self {
        Self {
            forward: self.inverse.clone(),
            inverse: self.forward.clone(),
        }
    }
}

/// Class, field and method tables loaded from one or more SRG files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
    pub classes: NameTable<String>,
    pub fields: NameTable<String>,
    pub methods: NameTable<MethodDescriptor>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SRG text. `origin` names the input in error messages.
    ///
    /// Blank lines and `#` comments are skipped. Any other line without the
    /// `": "` separator, with an unknown kind tag, or with the wrong number of
    /// arguments fails the whole load.
    pub fn parse_str(input: &str, origin: &str) -> Result<Self, MappingError> {
        let mut set = MappingSet::new();

        for (index, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = index + 1;

            let Some((kind, rest)) = line.split_once(": ") else {
                return Err(MappingError::malformed(
                    origin,
                    line_no,
                    line,
                    "missing \": \" separator",
                ));
            };
            let args: Vec<&str> = rest.split_whitespace().collect();

            match (kind, args.as_slice()) {
                ("PK", [_, _]) => {}
                ("CL", [old, new]) => set.classes.insert(old.to_string(), new.to_string()),
                ("FD", [old, new]) => set.fields.insert(old.to_string(), new.to_string()),
                ("MD", [old, old_sig, new, new_sig]) => set.methods.insert(
                    MethodDescriptor::new(*old, *old_sig),
                    MethodDescriptor::new(*new, *new_sig),
                ),
                ("PK" | "CL" | "FD" | "MD", _) => {
                    return Err(MappingError::malformed(
                        origin,
                        line_no,
                        line,
                        "wrong number of arguments",
                    ));
                }
                _ => {
                    return Err(MappingError::malformed(
                        origin,
                        line_no,
                        line,
                        "unrecognized kind tag",
                    ));
                }
            }
        }

        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let contents = read_input(path)?;
        Self::parse_str(&contents, &path.display().to_string())
    }

    /// The mapping file of a conf directory: multi-level package names if
    /// present, else the flat server mapping.
    pub fn find_in_conf(dir: impl AsRef<Path>) -> Result<PathBuf, MappingError> {
        let dir = dir.as_ref();
        CONF_MAPPINGS
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| MappingError::NoConfMapping {
                dir: dir.to_path_buf(),
            })
    }

    /// Load several files in order; later files override earlier ones.
    pub fn load_many<P: AsRef<Path>>(paths: &[P]) -> Result<Self, MappingError> {
        let mut merged = MappingSet::new();
        for path in paths {
            let set = Self::load(path)?;
            log::debug!(
                "Loaded {} classes, {} fields, {} methods from {}",
                set.classes.len(),
                set.fields.len(),
                set.methods.len(),
                path.as_ref().display()
            );
            merged.merge(&set);
        }
        Ok(merged)
    }

    /// Layer `other` on top of `self`; `other` wins on collisions.
    pub fn merge(&mut self, other: &MappingSet) {
        self.classes.extend(&other.classes);
        self.fields.extend(&other.fields);
        self.methods.extend(&other.methods);
    }

    /// The same mappings read new → old.
    pub fn reversed(&self) -> Self {
        Self {
            classes: self.classes.reversed(),
            fields: self.fields.reversed(),
            methods: self.methods.reversed(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }
}
