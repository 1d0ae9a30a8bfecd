use crate::apply::Correction;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct RemapConfig {
    /// Handling of files no `[[trees]]` rule matches
    #[serde(default)]
    pub default_mode: TreeMode,
    #[serde(default)]
    pub default_annotate: bool,
    pub sources: Sources,
    #[serde(default)]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub namespace: Namespace,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub trees: Vec<TreeRule>,
    #[serde(default)]
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Sources {
    pub src_root: PathBuf,
    pub range_map: PathBuf,
    /// Mapping files, later ones winning on collisions
    #[serde(default)]
    pub srg: Vec<PathBuf>,
    #[serde(default)]
    pub lv_range_map: Option<PathBuf>,
    /// Internal package assumed for local-variable classes the mappings lack
    #[serde(default)]
    pub lv_fallback_package: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Parameters {
    pub exc: PathBuf,
    /// Extra `.exc` layers; entries the mappings cannot translate are kept
    #[serde(default)]
    pub overrides: Vec<PathBuf>,
    #[serde(default)]
    pub param_names: Option<PathBuf>,
    #[serde(default)]
    pub method_names: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Namespace {
    /// Internal-name prefix of the namespace being renamed, e.g. `net/minecraft`
    #[serde(default)]
    pub renamed: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    #[serde(default = "default_true")]
    pub rewrite_files: bool,
    #[serde(default = "default_true")]
    pub rename_files: bool,
    #[serde(default)]
    pub dump_rename_map: bool,
    #[serde(default = "default_git")]
    pub git: String,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            rewrite_files: true,
            rename_files: true,
            dump_rename_map: false,
            git: default_git(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_git() -> String {
    "git".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TreeMode {
    /// Leave files untouched
    Skip,
    /// Simple names plus imports, relocating renamed classes
    #[default]
    Rename,
    /// Fully-qualified names, no imports, no relocation
    Qualify,
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeMode::Skip => "skip",
            TreeMode::Rename => "rename",
            TreeMode::Qualify => "qualify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TreeRule {
    /// Root-relative path prefix
    pub prefix: String,
    pub mode: TreeMode,
    #[serde(default)]
    pub annotate: bool,
}

impl RemapConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if is_empty_path(&self.sources.src_root) {
            issues.push(ValidationIssue::MissingField {
                field: "sources.src_root",
            });
        }
        if is_empty_path(&self.sources.range_map) {
            issues.push(ValidationIssue::MissingField {
                field: "sources.range_map",
            });
        }
        if self.sources.srg.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "sources.srg",
            });
        }
        if self.sources.srg.iter().any(|path| is_empty_path(path)) {
            issues.push(ValidationIssue::InvalidValue {
                field: "sources.srg".to_string(),
                message: "mapping paths must not be empty".to_string(),
            });
        }

        if let Some(package) = &self.sources.lv_fallback_package {
            if package.contains('.') {
                issues.push(ValidationIssue::InvalidValue {
                    field: "sources.lv_fallback_package".to_string(),
                    message: format!("{package:?} must use '/' separators"),
                });
            }
            if self.sources.lv_range_map.is_none() {
                issues.push(ValidationIssue::InvalidValue {
                    field: "sources.lv_fallback_package".to_string(),
                    message: "only meaningful together with sources.lv_range_map".to_string(),
                });
            }
        }

        if let Some(parameters) = &self.parameters {
            if is_empty_path(&parameters.exc) {
                issues.push(ValidationIssue::MissingField {
                    field: "parameters.exc",
                });
            }
        }

        if self.namespace.renamed.contains('.') {
            issues.push(ValidationIssue::InvalidValue {
                field: "namespace.renamed".to_string(),
                message: format!("{:?} must use '/' separators", self.namespace.renamed),
            });
        }

        for (idx, rule) in self.trees.iter().enumerate() {
            if rule.prefix.trim().is_empty() {
                issues.push(ValidationIssue::InvalidValue {
                    field: format!("trees[{idx}].prefix"),
                    message: "prefix must not be empty".to_string(),
                });
            }
            if rule.annotate && rule.mode == TreeMode::Skip {
                issues.push(ValidationIssue::InvalidValue {
                    field: format!("trees[{idx}].annotate"),
                    message: "skipped trees cannot be annotated".to_string(),
                });
            }
        }

        for (idx, correction) in self.corrections.iter().enumerate() {
            if correction.find.is_empty() {
                issues.push(ValidationIssue::InvalidValue {
                    field: format!("corrections[{idx}].find"),
                    message: "search text must not be empty".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Resolve every relative path against `base`, normally the directory
    /// holding the config file.
    pub fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        rebase(&mut self.sources.src_root);
        rebase(&mut self.sources.range_map);
        self.sources.srg.iter_mut().for_each(rebase);
        self.sources.lv_range_map.iter_mut().for_each(rebase);

        if let Some(parameters) = &mut self.parameters {
            rebase(&mut parameters.exc);
            parameters.overrides.iter_mut().for_each(rebase);
            parameters.param_names.iter_mut().for_each(rebase);
            parameters.method_names.iter_mut().for_each(rebase);
        }
    }

    /// How to treat a root-relative file: the first rule whose prefix it
    /// starts with, else the defaults. Returns the mode and whether to annotate.
    pub fn tree_mode_for(&self, file: &str) -> (TreeMode, bool) {
        self.trees
            .iter()
            .find(|rule| file.starts_with(&rule.prefix))
            .map_or((self.default_mode, self.default_annotate), |rule| {
                (rule.mode, rule.annotate)
            })
    }
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidValue { field: String, message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}
