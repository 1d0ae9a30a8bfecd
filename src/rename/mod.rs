//! The flat rename table the applier consumes.
//!
//! Built once per run from the chained mappings plus optional parameter and
//! local-variable sources, then read-only. Sources are layered in the order
//! the builder methods are called; a later layer replaces earlier entries
//! for the same key.

pub mod builder;

pub use builder::{local_variable_renames, RenameTableBuilder};

use crate::key::{
    internal_to_source, split_base_name, split_member, split_package_name, SymbolKey, SymbolKind,
};
use crate::mapping::MappingSet;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// How a key got its new name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The key has its own entry.
    Direct(&'a str),
    /// The key is a constructor named after the class's new name.
    Constructor(&'a str),
}

impl<'a> Resolution<'a> {
    pub fn name(self) -> &'a str {
        match self {
            Resolution::Direct(name) | Resolution::Constructor(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTables {
    /// Symbol → replacement text for its occurrences
    renames: BTreeMap<SymbolKey, String>,
    /// Class symbol → new fully-qualified source name to import
    imports: BTreeMap<SymbolKey, String>,
}

impl RenameTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class, package, field and method entries for a mapping.
    ///
    /// Occurrences are renamed to simple names; the fully-qualified class
    /// name goes to the import table instead. Every mapped class also gets
    /// a `package` entry, keyed by the old class, carrying its new package
    /// in source form, since a package-qualifier range never covers the
    /// class name itself.
    pub fn from_mappings(mappings: &MappingSet) -> Self {
        let mut tables = RenameTables::new();

        for (old, new) in mappings.classes.iter() {
            tables.insert(SymbolKey::class(old.as_str()), split_base_name(new));
            tables
                .imports
                .insert(SymbolKey::class(old.as_str()), internal_to_source(new));
            tables.insert(
                SymbolKey::package(old.as_str()),
                internal_to_source(split_package_name(new)),
            );
        }

        for (old, new) in mappings.fields.iter() {
            let (class, name) = split_member(old);
            tables.insert(SymbolKey::field(class, name), split_base_name(new));
        }

        for (old, new) in mappings.methods.iter() {
            tables.insert(
                SymbolKey::method(old.class(), old.simple_name(), old.signature.as_str()),
                new.simple_name(),
            );
        }

        tables
    }

    /// Set `key → name`, replacing any earlier entry.
    pub fn insert(&mut self, key: SymbolKey, name: impl Into<String>) {
        self.renames.insert(key, name.into());
    }

    pub fn get(&self, key: &SymbolKey) -> Option<&str> {
        self.renames.get(key).map(String::as_str)
    }

    pub fn import_for(&self, key: &SymbolKey) -> Option<&str> {
        self.imports.get(key).map(String::as_str)
    }

    /// Whether renamed classes are imported (as opposed to written qualified).
    pub fn has_imports(&self) -> bool {
        !self.imports.is_empty()
    }

    /// Look up a key's new name, synthesizing constructor renames.
    ///
    /// Constructors have no method-table entries of their own; a method
    /// named after its declaring class with a void descriptor takes the
    /// class's new name instead. `None` means the symbol is not renamed.
    pub fn resolve(&self, key: &SymbolKey) -> Option<Resolution<'_>> {
        if let Some(name) = self.get(key) {
            return Some(Resolution::Direct(name));
        }
        let class = key.constructor_class()?;
        let class_rename = self.get(&SymbolKey::class(class))?;
        Some(Resolution::Constructor(split_base_name(class_rename)))
    }

    /// The variant used for trees that reference renamed classes fully
    /// qualified: classes map to their new qualified name, package
    /// qualifiers are deleted, and nothing is imported.
    pub fn qualified(&self) -> Self {
        let mut renames = self.renames.clone();
        for (key, name) in renames.iter_mut() {
            match key.kind() {
                SymbolKind::Class => {
                    if let Some(qualified) = self.imports.get(key) {
                        name.clone_from(qualified);
                    }
                }
                SymbolKind::Package => name.clear(),
                _ => {}
            }
        }
        Self {
            renames,
            imports: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SymbolKey, &str)> {
        self.renames.iter().map(|(key, name)| (key, name.as_str()))
    }

    /// Write every entry as a `KEY -> NEWNAME` line, sorted by key.
    pub fn write_dump(&self, mut out: impl Write) -> io::Result<()> {
        for (key, name) in &self.renames {
            writeln!(out, "{key} -> {name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> RenameTables {
        let mappings = MappingSet::parse_str(
            "CL: nms/Block mcp/block/Block\n\
             CL: nms/World mcp/world/World\n\
             FD: nms/Block/a mcp/block/Block/hardness\n\
             MD: nms/Block/b (Lnms/World;)V mcp/block/Block/onPlaced (Lmcp/world/World;)V\n",
            "test",
        )
        .unwrap();
        RenameTables::from_mappings(&mappings)
    }

    #[test]
    fn test_entries_use_simple_names() {
        let tables = tables();
        assert_eq!(tables.get(&SymbolKey::class("nms/Block")), Some("Block"));
        assert_eq!(tables.get(&SymbolKey::field("nms/Block", "a")), Some("hardness"));
        assert_eq!(
            tables.get(&SymbolKey::method("nms/Block", "b", "(Lnms/World;)V")),
            Some("onPlaced")
        );
        assert_eq!(
            tables.import_for(&SymbolKey::class("nms/Block")),
            Some("mcp.block.Block")
        );
    }

    #[test]
    fn test_package_entries_keyed_by_old_class() {
        let tables = tables();
        assert_eq!(tables.get(&SymbolKey::package("nms/Block")), Some("mcp.block"));
        assert_eq!(tables.get(&SymbolKey::package("nms/World")), Some("mcp.world"));
    }

    #[test]
    fn test_constructor_synthesis() {
        let tables = tables();
        let constructor = SymbolKey::method("nms/Block", "Block", "(I)V");
        assert_eq!(
            tables.resolve(&constructor),
            Some(Resolution::Constructor("Block"))
        );

        let mappings = MappingSet::parse_str("CL: a/Foo b/Bar\n", "t").unwrap();
        let tables = RenameTables::from_mappings(&mappings);
        let resolved = tables.resolve(&SymbolKey::method("a/Foo", "Foo", "(Ljava/lang/String;)V"));
        assert_eq!(resolved.map(Resolution::name), Some("Bar"));
    }

    #[test]
    fn test_non_constructor_unresolved() {
        let tables = tables();
        assert_eq!(tables.resolve(&SymbolKey::method("nms/Block", "c", "()V")), None);
        // constructor shape, but the class is not renamed
        assert_eq!(tables.resolve(&SymbolKey::method("x/Foo", "Foo", "()V")), None);
        // class-named method that returns a value is not a constructor
        assert_eq!(tables.resolve(&SymbolKey::method("nms/Block", "Block", "()I")), None);
    }

    #[test]
    fn test_qualified_tables() {
        let qualified = tables().qualified();
        assert_eq!(qualified.get(&SymbolKey::class("nms/Block")), Some("mcp.block.Block"));
        assert_eq!(qualified.get(&SymbolKey::package("nms/Block")), Some(""));
        assert_eq!(qualified.get(&SymbolKey::field("nms/Block", "a")), Some("hardness"));
        assert!(!qualified.has_imports());
    }

    #[test]
    fn test_dump_lines() {
        let mut out = Vec::new();
        tables().write_dump(&mut out).unwrap();
        let dump = String::from_utf8(out).unwrap();
        assert!(dump.contains("class nms/Block -> Block\n"));
        assert!(dump.contains("package nms/Block -> mcp.block\n"));
        assert!(dump.contains("method nms/Block/b (Lnms/World;)V -> onPlaced\n"));
    }

    #[test]
    fn test_insert_overrides() {
        let mut tables = tables();
        tables.insert(SymbolKey::class("nms/Block"), "Brick");
        assert_eq!(tables.get(&SymbolKey::class("nms/Block")), Some("Brick"));
    }
}
