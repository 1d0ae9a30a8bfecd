//! Composing two mappings that share their old namespace.
//!
//! Given `A: old → a` and `B: old → b`, [`chain`] produces `a → b`. Symbols
//! that only one side knows about (client-only members when one side is a
//! server artifact, for instance) are dropped without complaint.

use super::descriptive::DescriptiveNames;
use super::loader::{MappingSet, MethodDescriptor, NameTable};

/// Chain `a` and `b` through their shared old names into `a`-names → `b`-names.
///
/// When `overlay` is given, the leaf of every resulting `b`-name is run
/// through it, so indexed placeholders come out descriptive.
pub fn chain(a: &MappingSet, b: &MappingSet, overlay: Option<&DescriptiveNames>) -> MappingSet {
    let mut out = MappingSet::new();

    chain_table(&a.classes, &b.classes, "CL", &mut out.classes, |name| {
        describe_name(name, overlay)
    });
    chain_table(&a.fields, &b.fields, "FD", &mut out.fields, |name| {
        describe_name(name, overlay)
    });
    chain_table(&a.methods, &b.methods, "MD", &mut out.methods, |method| {
        describe_method(method, overlay)
    });

    out
}

/// Apply only the descriptive overlay: `old → describe(a-name)`.
pub fn describe(a: &MappingSet, overlay: &DescriptiveNames) -> MappingSet {
    let mut out = MappingSet::new();
    for (old, new) in a.classes.iter() {
        out.classes.insert(old.clone(), overlay.describe(new));
    }
    for (old, new) in a.fields.iter() {
        out.fields.insert(old.clone(), overlay.describe(new));
    }
    for (old, new) in a.methods.iter() {
        out.methods.insert(old.clone(), describe_method(new, Some(overlay)));
    }
    out
}

fn chain_table<K, F>(a: &NameTable<K>, b: &NameTable<K>, tag: &str, out: &mut NameTable<K>, map_b: F)
where
    K: Ord + Clone,
    F: Fn(&K) -> K,
{
    let mut missing = 0usize;
    for (old, name_a) in a.iter() {
        match b.get(old) {
            Some(name_b) => out.insert(name_a.clone(), map_b(name_b)),
            None => missing += 1,
        }
    }
    if missing > 0 {
        log::debug!("{missing} {tag} entries have no counterpart in the second mapping");
    }
}

fn describe_name(name: &String, overlay: Option<&DescriptiveNames>) -> String {
    match overlay {
        Some(overlay) => overlay.describe(name),
        None => name.clone(),
    }
}

fn describe_method(method: &MethodDescriptor, overlay: Option<&DescriptiveNames>) -> MethodDescriptor {
    MethodDescriptor::new(describe_name(&method.name, overlay), method.signature.clone())
}

/// Render a mapping back to SRG lines: classes, then fields, then methods,
/// each sorted by old name.
pub fn render_srg(set: &MappingSet) -> String {
    let mut out = String::new();
    for (old, new) in set.classes.iter() {
        out.push_str(&format!("CL: {old} {new}\n"));
    }
    for (old, new) in set.fields.iter() {
        out.push_str(&format!("FD: {old} {new}\n"));
    }
    for (old, new) in set.methods.iter() {
        out.push_str(&format!("MD: {old} {new}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn parse(srg: &str) -> MappingSet {
        MappingSet::parse_str(srg, "test").unwrap()
    }

    #[test]
    fn test_chain_classes() {
        let a = parse("CL: x/Y a/B\n");
        let b = parse("CL: x/Y c/D\n");
        let chained = chain(&a, &b, None);
        assert_eq!(chained.classes.get(&"a/B".to_string()).unwrap(), "c/D");
        assert_eq!(chained.classes.len(), 1);
    }

    #[test]
    fn test_chain_drops_keys_missing_from_b() {
        let a = parse("CL: x/Y a/B\nCL: x/Client a/Client\n");
        let b = parse("CL: x/Y c/D\nCL: x/ServerOnly c/S\n");
        let chained = chain(&a, &b, None);
        assert_eq!(chained.classes.len(), 1);
        assert!(chained.classes.get(&"a/Client".to_string()).is_none());
        assert!(chained.classes.get_inverse(&"c/S".to_string()).is_none());
    }

    #[test]
    fn test_chain_methods_keep_signatures() {
        let a = parse("MD: x/Y/a (Lx/Y;)V a/B/tick (La/B;)V\n");
        let b = parse("MD: x/Y/a (Lx/Y;)V c/D/func_1_a (Lc/D;)V\n");
        let chained = chain(&a, &b, None);
        let from = MethodDescriptor::new("a/B/tick", "(La/B;)V");
        assert_eq!(
            chained.methods.get(&from).unwrap(),
            &MethodDescriptor::new("c/D/func_1_a", "(Lc/D;)V")
        );
    }

    #[test]
    fn test_chain_with_overlay() {
        let a = parse("FD: x/Y/a a/B/health\nMD: x/Y/b ()V a/B/tick ()V\n");
        let b = parse("FD: x/Y/a c/D/field_5_h\nMD: x/Y/b ()V c/D/func_6_t ()V\n");
        let mut fields = BTreeMap::new();
        fields.insert("field_5_h".to_string(), "health".to_string());
        let mut methods = BTreeMap::new();
        methods.insert("func_6_t".to_string(), "onUpdate".to_string());
        let overlay = DescriptiveNames::new(fields, methods);

        let chained = chain(&a, &b, Some(&overlay));
        assert_eq!(chained.fields.get(&"a/B/health".to_string()).unwrap(), "c/D/health");
        assert_eq!(
            chained.methods.get(&MethodDescriptor::new("a/B/tick", "()V")).unwrap(),
            &MethodDescriptor::new("c/D/onUpdate", "()V")
        );
    }

    #[test]
    fn test_describe_only() {
        let a = parse("FD: x/Y/a c/D/field_5_h\n");
        let mut fields = BTreeMap::new();
        fields.insert("field_5_h".to_string(), "health".to_string());
        let described = describe(&a, &DescriptiveNames::new(fields, BTreeMap::new()));
        assert_eq!(described.fields.get(&"x/Y/a".to_string()).unwrap(), "c/D/health");
    }

    #[test]
    fn test_render_srg_parses_back() {
        let srg = "CL: a/A b/B\nFD: a/A/f b/B/g\nMD: a/A/m ()V b/B/n ()V\n";
        let set = parse(srg);
        assert_eq!(render_srg(&set), srg);
    }
}
