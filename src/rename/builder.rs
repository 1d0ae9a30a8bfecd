use super::RenameTables;
use crate::key::{remap_signature, split_base_name, SymbolKey};
use crate::mapping::{MappingSet, MethodDescriptor, ParameterMap};
use crate::rangemap::FileRecord;

/// Method name range maps use for initializer blocks.
const INITIALIZER: &str = "{}";

/// Layers rename sources on top of a mapping, in call order.
///
/// ```
/// use symbol_remap::mapping::{MappingSet, ParameterMap};
/// use symbol_remap::rename::RenameTableBuilder;
///
/// let mappings = MappingSet::parse_str("CL: a/Foo b/Bar\n", "inline").unwrap();
/// let tables = RenameTableBuilder::new(&mappings)
///     .parameters(&ParameterMap::new())
///     .build();
/// assert_eq!(tables.len(), 2);
/// ```
#[derive(Debug)]
pub struct RenameTableBuilder<'a> {
    mappings: &'a MappingSet,
    tables: RenameTables,
}

impl<'a> RenameTableBuilder<'a> {
    pub fn new(mappings: &'a MappingSet) -> Self {
        Self {
            mappings,
            tables: RenameTables::from_mappings(mappings),
        }
    }

    /// Add parameter names given in the mapping's *target* namespace.
    ///
    /// Methods that do not translate back (client-only methods, usually)
    /// are left out.
    pub fn parameters(mut self, params: &ParameterMap) -> Self {
        let translated = params.translate(self.mappings, false);
        if !translated.removed.is_empty() {
            log::debug!(
                "{} parameter entries have no counterpart in the mappings",
                translated.removed.len()
            );
        }
        self.add_parameters(&translated.params);
        self
    }

    /// Add a supplementary parameter layer that may target methods the
    /// mappings do not know; those keep their own class name.
    pub fn parameter_overrides(mut self, params: &ParameterMap) -> Self {
        let translated = params.translate(self.mappings, true);
        self.add_parameters(&translated.params);
        self
    }

    /// Add local-variable names taken from a range map of an equivalent
    /// build in the target namespace.
    pub fn local_variables(mut self, records: &[FileRecord], fallback_package: Option<&str>) -> Self {
        for (key, name) in local_variable_renames(records, self.mappings, fallback_package) {
            self.tables.insert(key, name);
        }
        self
    }

    /// Add one explicit entry.
    pub fn entry(mut self, key: SymbolKey, name: impl Into<String>) -> Self {
        self.tables.insert(key, name);
        self
    }

    pub fn build(self) -> RenameTables {
        self.tables
    }

    fn add_parameters(&mut self, params: &ParameterMap) {
        for (method, names) in params.iter() {
            for (index, name) in names.iter().enumerate() {
                self.tables.insert(
                    SymbolKey::param(
                        method.class(),
                        method.simple_name(),
                        method.signature.as_str(),
                        index,
                    ),
                    name.as_str(),
                );
            }
        }
    }
}

/// Derive positional local-variable renames from another build's range map.
///
/// The records name their method in the target namespace; each is matched
/// back to the old namespace by class, method, signature and index through
/// the inverse tables. A variable whose method cannot be matched is skipped.
/// Classes unknown to the inverse table are assumed to keep their simple
/// name in `fallback_package` when one is given, and skipped otherwise.
pub fn local_variable_renames(
    records: &[FileRecord],
    mappings: &MappingSet,
    fallback_package: Option<&str>,
) -> Vec<(SymbolKey, String)> {
    let inverse_classes = mappings.classes.inverse();
    let mut renames = Vec::new();

    for file_record in records {
        let record = &file_record.record;
        let SymbolKey::LocalVar {
            class: target_class,
            method,
            signature,
            index,
        } = &record.key
        else {
            continue;
        };

        let class = match (inverse_classes.get(target_class), fallback_package) {
            (Some(class), _) => class.clone(),
            (None, Some(package)) => {
                let class = format!("{package}/{}", split_base_name(target_class));
                log::warn!("No old class name for {target_class}, assuming {class}");
                class
            }
            (None, None) => {
                log::warn!("No old class name for {target_class}; skipping local variable {index} of {method}");
                continue;
            }
        };

        let key = if method == INITIALIZER {
            SymbolKey::local_var(class, INITIALIZER, "", *index)
        } else if split_base_name(target_class) == method {
            let constructor = split_base_name(&class).to_string();
            SymbolKey::local_var(
                class,
                constructor,
                remap_signature(signature, inverse_classes),
                *index,
            )
        } else {
            let target = MethodDescriptor::new(format!("{target_class}/{method}"), signature.as_str());
            match mappings.methods.get_inverse(&target) {
                Some(old) => {
                    SymbolKey::local_var(old.class(), old.simple_name(), old.signature.as_str(), *index)
                }
                None => {
                    log::info!("Local variables available for {target} but no inverse method mapping; skipping");
                    continue;
                }
            }
        };

        renames.push((key, record.expected.clone()));
    }

    renames
}
