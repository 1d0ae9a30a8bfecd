use crate::key::{source_to_internal, SymbolKey};
use crate::rename::RenameTables;
use std::collections::BTreeSet;

const IMPORT: &str = "import ";
const PACKAGE: &str = "package ";

/// Rewrite the import section of a file after its symbols were renamed.
///
/// `namespace` is the renamed namespace in source form (`net.minecraft`).
/// Existing imports from it are dropped when `tables` has no import table,
/// and otherwise rewritten to the class's new qualified name; wildcard
/// imports from it are always dropped. `required` imports are inserted,
/// sorted, after the last import line, after the `package` line when the
/// file has no imports, or at the top when it has neither.
pub fn update_imports(
    text: &str,
    required: &BTreeSet<String>,
    tables: &RenameTables,
    namespace: &str,
) -> String {
    let added: Vec<String> = required.iter().map(|name| import_line(name)).collect();
    let namespace_prefix = format!("{IMPORT}{namespace}.");

    let mut lines: Vec<String> = Vec::new();
    let mut rewritten = BTreeSet::new();
    let mut after_imports = None;

    for line in text.split('\n') {
        if !line.starts_with(IMPORT) {
            lines.push(line.to_string());
            continue;
        }

        if namespace.is_empty() || !line.starts_with(&namespace_prefix) {
            lines.push(line.to_string());
        } else if let Some(new_line) = rewrite_import(line, tables) {
            if !added.contains(&new_line) && rewritten.insert(new_line.clone()) {
                lines.push(new_line);
            }
        }
        after_imports = Some(lines.len());
    }

    if added.is_empty() {
        return lines.join("\n");
    }

    let insert_at = after_imports.unwrap_or_else(|| {
        lines
            .iter()
            .position(|line| line.starts_with(PACKAGE))
            .map_or(0, |package| package + 1)
    });
    lines.splice(insert_at..insert_at, added);
    lines.join("\n")
}

fn import_line(name: &str) -> String {
    format!("{IMPORT}{name};")
}

/// The replacement for an import from the renamed namespace, or `None` to drop it.
fn rewrite_import(line: &str, tables: &RenameTables) -> Option<String> {
    if !tables.has_imports() {
        return None;
    }

    let imported = line[IMPORT.len()..].trim().trim_end_matches(';').trim_end();
    if imported.ends_with(".*") {
        return None;
    }

    match tables.import_for(&SymbolKey::class(source_to_internal(imported))) {
        Some(new_name) => Some(import_line(new_name)),
        None => {
            log::warn!("No new name for import {imported}; keeping it");
            Some(line.to_string())
        }
    }
}
