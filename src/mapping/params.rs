//! Parameter names from `.exc` files.
//!
//! Each relevant line names a method and its positional parameter ids:
//!
//! ```text
//! net/minecraft/block/Block.func_149672_a(Lnet/minecraft/world/World;I)V=|p_149672_1_,p_149672_2_
//! net/minecraft/block/Block.<init>(Lnet/minecraft/block/material/Material;)V=|p_i45394_1_
//! ```
//!
//! These are expressed in the *target* namespace of the chained mappings, so
//! before they can key renames they are translated back through the inverse
//! class and method tables.

use super::errors::{read_input, MappingError};
use super::loader::{MappingSet, MethodDescriptor};
use crate::key::{remap_signature, split_base_name};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Method name used by `.exc` files for constructors.
pub const CONSTRUCTOR: &str = "<init>";

fn exc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([^.]+)\.([^(]+)(\([^=]+)=([^|]*)\|(.*)").expect("static exc pattern")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcEntry {
    pub class: String,
    pub method: String,
    pub signature: String,
    pub exceptions: Vec<String>,
    pub params: Vec<String>,
}

fn split_list(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        Vec::new()
    } else {
        list.split(',').map(|item| item.trim().to_string()).collect()
    }
}

/// Parse the method lines of an `.exc` file. Other lines (access
/// transformer entries, comments) are not parameter data and are skipped.
pub fn parse_exc(input: &str) -> Vec<ExcEntry> {
    input
        .lines()
        .filter_map(|line| exc_pattern().captures(line.trim_end()))
        .map(|caps| ExcEntry {
            class: caps[1].to_string(),
            method: caps[2].to_string(),
            signature: caps[3].to_string(),
            exceptions: split_list(&caps[4]),
            params: split_list(&caps[5]),
        })
        .collect()
}

/// Optional descriptive names applied while reading an `.exc` file.
#[derive(Debug, Clone, Default)]
pub struct ExcNames {
    /// Indexed method id → descriptive method name.
    pub methods: BTreeMap<String, String>,
    /// Indexed parameter id → descriptive parameter name.
    pub params: BTreeMap<String, String>,
}

/// Method → positional parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: BTreeMap<MethodDescriptor, Vec<String>>,
}

/// A parameter map moved into the old namespace.
#[derive(Debug, Clone, Default)]
pub struct TranslatedParameters {
    pub params: ParameterMap,
    /// Methods the inverse tables did not know (client-only methods, usually).
    pub removed: Vec<MethodDescriptor>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_exc(entries: &[ExcEntry], names: Option<&ExcNames>) -> Self {
        let mut map = ParameterMap::new();
        for entry in entries {
            let method = match names {
                Some(names) if entry.method != CONSTRUCTOR => names
                    .methods
                    .get(&entry.method)
                    .unwrap_or(&entry.method)
                    .as_str(),
                _ => entry.method.as_str(),
            };
            let params = entry
                .params
                .iter()
                .map(|param| match names {
                    Some(names) => names.params.get(param).unwrap_or(param).clone(),
                    None => param.clone(),
                })
                .collect();
            map.insert(
                MethodDescriptor::new(format!("{}/{}", entry.class, method), &entry.signature),
                params,
            );
        }
        map
    }

    pub fn load(path: impl AsRef<Path>, names: Option<&ExcNames>) -> Result<Self, MappingError> {
        let contents = read_input(path.as_ref())?;
        Ok(Self::from_exc(&parse_exc(&contents), names))
    }

    pub fn insert(&mut self, method: MethodDescriptor, params: Vec<String>) {
        self.entries.insert(method, params);
    }

    pub fn get(&self, method: &MethodDescriptor) -> Option<&[String]> {
        self.entries.get(method).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MethodDescriptor, &[String])> {
        self.entries.iter().map(|(method, params)| (method, params.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer `other` on top of `self`; `other` wins per method.
    pub fn extend(&mut self, other: ParameterMap) {
        self.entries.extend(other.entries);
    }

    /// Translate target-namespace method keys back to the old namespace of `mappings`.
    ///
    /// Constructors go through the inverse class table, everything else through
    /// the inverse method table. Methods that do not resolve are reported in
    /// `removed`; with `keep_missing` they are kept anyway under their own
    /// class, with only the signature translated.
    pub fn translate(&self, mappings: &MappingSet, keep_missing: bool) -> TranslatedParameters {
        let inverse_classes = mappings.classes.inverse();
        let mut out = TranslatedParameters::default();

        for (method, params) in &self.entries {
            let old = if method.simple_name() == CONSTRUCTOR {
                let class = method.class();
                let old_class = match inverse_classes.get(class) {
                    Some(old_class) => old_class.as_str(),
                    None => {
                        out.removed.push(method.clone());
                        if !keep_missing {
                            continue;
                        }
                        class
                    }
                };
                MethodDescriptor::new(
                    format!("{old_class}/{}", split_base_name(old_class)),
                    remap_signature(&method.signature, inverse_classes),
                )
            } else if let Some(old) = mappings.methods.get_inverse(method) {
                old.clone()
            } else {
                out.removed.push(method.clone());
                if !keep_missing {
                    continue;
                }
                MethodDescriptor::new(
                    method.name.clone(),
                    remap_signature(&method.signature, inverse_classes),
                )
            };
            out.params.insert(old, params.clone());
        }

        out
    }
}
