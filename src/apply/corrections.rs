use serde::Deserialize;

/// One literal find/replace pair of the final correction pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Correction {
    pub find: String,
    pub replace: String,
}

impl Correction {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Literal replacements run over each rewritten file, in order.
///
/// Some extractor builds emit a package qualifier and the class reference
/// it qualifies as overlapping ranges; after both are renamed the text ends
/// up doubly qualified. These pairs undo known instances of that. They are
/// plain text replacements with no knowledge of the source language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corrections {
    entries: Vec<Correction>,
}

impl Corrections {
    pub fn new(entries: Vec<Correction>) -> Self {
        Self { entries }
    }

    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for correction in &self.entries {
            if correction.find.is_empty() || !text.contains(&correction.find) {
                continue;
            }
            log::debug!("Correcting {:?} -> {:?}", correction.find, correction.replace);
            text = text.replace(&correction.find, &correction.replace);
        }
        text
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Correction> for Corrections {
    fn from_iter<I: IntoIterator<Item = Correction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
