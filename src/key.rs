//! Symbol identities and the name conventions they are built from.
//!
//! Bytecode-style *internal* names separate package components with `/`
//! (`net/minecraft/server/Block`), while Java source uses `.`
//! (`net.minecraft.server.Block`). Every table in this crate is keyed by
//! internal names; conversion to source form only happens when text is
//! written back into a file.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Separator used by internal names and project-relative paths, on every platform.
pub const SEP: char = '/';

/// The kind tag of a renameable symbol, as spelled in range map records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Package,
    Class,
    Field,
    Method,
    Param,
    LocalVar,
}

impl SymbolKind {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "package" => Some(SymbolKind::Package),
            "class" => Some(SymbolKind::Class),
            "field" => Some(SymbolKind::Field),
            "method" => Some(SymbolKind::Method),
            "param" => Some(SymbolKind::Param),
            "localvar" => Some(SymbolKind::LocalVar),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Package => "package",
            SymbolKind::Class => "class",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Param => "param",
            SymbolKind::LocalVar => "localvar",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a renameable program entity in the *old* namespace.
///
/// Two occurrences denote the same symbol iff their keys are equal. Class
/// names are internal fully-qualified names; member names are simple names
/// qualified by their declaring class. Parameters and local variables are
/// identified by position only; their textual name is never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKey {
    /// Package qualifier of `class`, which is the class living in that package.
    Package { class: String },
    Class { name: String },
    Field { class: String, name: String },
    Method { class: String, name: String, signature: String },
    Param { class: String, method: String, signature: String, index: usize },
    LocalVar { class: String, method: String, signature: String, index: usize },
}

impl SymbolKey {
    pub fn package(class: impl Into<String>) -> Self {
        SymbolKey::Package { class: class.into() }
    }

    pub fn class(name: impl Into<String>) -> Self {
        SymbolKey::Class { name: name.into() }
    }

    pub fn field(class: impl Into<String>, name: impl Into<String>) -> Self {
        SymbolKey::Field {
            class: class.into(),
            name: name.into(),
        }
    }

    pub fn method(
        class: impl Into<String>,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        SymbolKey::Method {
            class: class.into(),
            name: name.into(),
            signature: signature.into(),
        }
    }

    pub fn param(
        class: impl Into<String>,
        method: impl Into<String>,
        signature: impl Into<String>,
        index: usize,
    ) -> Self {
        SymbolKey::Param {
            class: class.into(),
            method: method.into(),
            signature: signature.into(),
            index,
        }
    }

    pub fn local_var(
        class: impl Into<String>,
        method: impl Into<String>,
        signature: impl Into<String>,
        index: usize,
    ) -> Self {
        SymbolKey::LocalVar {
            class: class.into(),
            method: method.into(),
            signature: signature.into(),
            index,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolKey::Package { .. } => SymbolKind::Package,
            SymbolKey::Class { .. } => SymbolKind::Class,
            SymbolKey::Field { .. } => SymbolKind::Field,
            SymbolKey::Method { .. } => SymbolKind::Method,
            SymbolKey::Param { .. } => SymbolKind::Param,
            SymbolKey::LocalVar { .. } => SymbolKind::LocalVar,
        }
    }

    /// The internal name of the class this symbol belongs to (or is).
    pub fn owner(&self) -> &str {
        match self {
            SymbolKey::Package { class } => class,
            SymbolKey::Class { name } => name,
            SymbolKey::Field { class, .. }
            | SymbolKey::Method { class, .. }
            | SymbolKey::Param { class, .. }
            | SymbolKey::LocalVar { class, .. } => class,
        }
    }

    /// If this key has constructor shape, the internal name of the class it constructs.
    ///
    /// Constructors are reported as methods named after their declaring class
    /// with a `V` (void) return descriptor.
    pub fn constructor_class(&self) -> Option<&str> {
        match self {
            SymbolKey::Method {
                class,
                name,
                signature,
            } if signature.ends_with('V') && split_base_name(class) == name => Some(class),
            _ => None,
        }
    }

    /// Whether this key names something under `prefix` (an internal package prefix).
    pub fn is_within(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return false;
        }
        let owner = self.owner();
        owner == prefix
            || owner
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKey::Package { class } => write!(f, "package {class}"),
            SymbolKey::Class { name } => write!(f, "class {name}"),
            SymbolKey::Field { class, name } => write!(f, "field {class}/{name}"),
            SymbolKey::Method {
                class,
                name,
                signature,
            } => write!(f, "method {class}/{name} {signature}"),
            SymbolKey::Param {
                class,
                method,
                signature,
                index,
            } => write!(f, "param {class}/{method} {signature} {index}"),
            SymbolKey::LocalVar {
                class,
                method,
                signature,
                index,
            } => write!(f, "localvar {class}/{method} {signature} {index}"),
        }
    }
}

/// Everything before the last `/`, or `""` for a name in the default package.
pub fn split_package_name(full_name: &str) -> &str {
    full_name.rsplit_once(SEP).map_or("", |(package, _)| package)
}

/// Everything after the last `/`.
pub fn split_base_name(full_name: &str) -> &str {
    full_name.rsplit_once(SEP).map_or(full_name, |(_, base)| base)
}

pub fn internal_to_source(internal: &str) -> String {
    internal.replace(SEP, ".")
}

pub fn source_to_internal(source: &str) -> String {
    source.replace('.', "/")
}

/// Split `owner/member` into its declaring class and member name.
pub fn split_member(full_name: &str) -> (&str, &str) {
    (split_package_name(full_name), split_base_name(full_name))
}

fn object_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"L([^;]+);").expect("static descriptor pattern"))
}

/// Rewrite every object type `Lname;` in a method descriptor through `classes`.
///
/// Classes missing from the table are left as they are.
pub fn remap_signature(signature: &str, classes: &BTreeMap<String, String>) -> String {
    object_type_pattern()
        .replace_all(signature, |caps: &Captures<'_>| {
            let name = &caps[1];
            let mapped = classes.get(name).map_or(name, String::as_str);
            format!("L{mapped};")
        })
        .into_owned()
}
