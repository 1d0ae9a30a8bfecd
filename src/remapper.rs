//! One remapping run over a source tree.
//!
//! Everything is computed before anything is written: [`Remapper::plan`]
//! rewrites every file in memory, and only a plan that succeeded for every
//! file is handed to [`Remapper::persist`].

use crate::apply::{persist, ApplyError, Corrections, FileRemapper, PersistOptions, RemappedFile};
use crate::config::{Parameters, RemapConfig, TreeMode};
use crate::error::RemapError;
use crate::mapping::{load_csv_map, ExcNames, MappingError, MappingSet, ParameterMap};
use crate::rangemap::{load_records, RangeMap};
use crate::rename::{RenameTableBuilder, RenameTables};
use crate::safety::SourceRoot;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// The rewritten contents of every file a run touches, in path order.
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub files: Vec<RemappedFile>,
    /// Files the range map lists that were left alone
    pub skipped: Vec<String>,
}

impl RunPlan {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            skipped: self.skipped.len(),
            ..RunSummary::default()
        };
        for file in &self.files {
            summary.files += 1;
            summary.renamed += file.renamed;
            summary.imports_added += file.imports_added.len();
            if file.is_changed() {
                summary.changed += 1;
            }
            if file.relocation.is_some() {
                summary.relocated += 1;
            }
        }
        summary
    }

    pub fn changed(&self) -> impl Iterator<Item = &RemappedFile> {
        self.files.iter().filter(|file| file.is_changed())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files processed
    pub files: usize,
    pub skipped: usize,
    /// Files whose content or location changed
    pub changed: usize,
    /// Symbol occurrences renamed
    pub renamed: usize,
    pub imports_added: usize,
    pub relocated: usize,
}

pub struct Remapper {
    config: RemapConfig,
    root: SourceRoot,
    tables: RenameTables,
    qualified: RenameTables,
    ranges: RangeMap,
    corrections: Corrections,
}

impl Remapper {
    /// Load every input the config names.
    pub fn new(config: RemapConfig) -> Result<Self, RemapError> {
        let root = SourceRoot::new(&config.sources.src_root)?;

        log::info!("Building rename tables");
        let tables = build_tables(&config)?;
        log::info!("{} rename entries", tables.len());

        let ranges = RangeMap::load(&config.sources.range_map, &root)?;
        log::info!(
            "{} range records across {} files",
            ranges.record_count(),
            ranges.len()
        );

        let qualified = tables.qualified();
        let corrections = config.corrections.iter().cloned().collect();

        Ok(Self {
            config,
            root,
            tables,
            qualified,
            ranges,
            corrections,
        })
    }

    pub fn config(&self) -> &RemapConfig {
        &self.config
    }

    pub fn tables(&self) -> &RenameTables {
        &self.tables
    }

    pub fn range_map(&self) -> &RangeMap {
        &self.ranges
    }

    /// Rewrite every file the range map lists, in memory.
    ///
    /// Any fatal error in any file fails the whole plan.
    pub fn plan(&self) -> Result<RunPlan, RemapError> {
        let namespace = self.config.namespace.renamed.as_str();
        let mut plan = RunPlan::default();
        let mut targets: BTreeMap<String, String> = BTreeMap::new();

        for (file, records) in self.ranges.files() {
            if Path::new(file).is_absolute() {
                log::warn!("Skipping {file}: outside the source root");
                plan.skipped.push(file.to_string());
                continue;
            }

            let (mode, annotate) = self.config.tree_mode_for(file);
            let tables = match mode {
                TreeMode::Skip => {
                    log::debug!("Skipping {file}");
                    plan.skipped.push(file.to_string());
                    continue;
                }
                TreeMode::Rename => &self.tables,
                TreeMode::Qualify => &self.qualified,
            };

            let path = self.root.resolve(file)?;
            let source = fs::read_to_string(&path).map_err(|source| ApplyError::Io {
                path: path.clone(),
                source,
            })?;

            let mut remapped = FileRemapper::new(tables, &self.corrections, namespace)
                .annotate(annotate)
                .remap(file, &source, records)?;

            if mode == TreeMode::Qualify {
                remapped.relocation = None;
            }
            if let Some(target) = &remapped.relocation {
                if targets.insert(target.clone(), file.to_string()).is_some() {
                    return Err(ApplyError::RelocationConflict {
                        from: file.to_string(),
                        to: target.clone(),
                    }
                    .into());
                }
            }

            plan.files.push(remapped);
        }

        if self.config.output.rename_files {
            self.check_destinations(&plan)?;
        }

        Ok(plan)
    }

    /// Refuse any move onto a file that exists and is not moved away
    /// earlier in the plan.
    fn check_destinations(&self, plan: &RunPlan) -> Result<(), RemapError> {
        let mut vacated = BTreeSet::new();
        for remapped in &plan.files {
            let Some(target) = &remapped.relocation else {
                continue;
            };
            if !vacated.contains(target.as_str()) && self.root.resolve(target)?.exists() {
                return Err(ApplyError::RelocationConflict {
                    from: remapped.file.clone(),
                    to: target.clone(),
                }
                .into());
            }
            vacated.insert(remapped.file.as_str());
        }
        Ok(())
    }

    /// Write out a plan according to the config's output settings.
    pub fn persist(&self, plan: &RunPlan) -> Result<RunSummary, RemapError> {
        let output = &self.config.output;
        let options = PersistOptions {
            rewrite: output.rewrite_files,
            relocate: output.rename_files,
            git: output.git.clone(),
        };

        for remapped in plan.changed() {
            persist(&self.root, remapped, &options)?;
        }

        Ok(plan.summary())
    }

    pub fn run(&self) -> Result<RunSummary, RemapError> {
        let plan = self.plan()?;
        self.persist(&plan)
    }
}

/// Build the rename tables from the config's mapping, parameter and
/// local-variable sources.
pub fn build_tables(config: &RemapConfig) -> Result<RenameTables, RemapError> {
    let mappings = MappingSet::load_many(&config.sources.srg)?;
    let mut builder = RenameTableBuilder::new(&mappings);

    if let Some(parameters) = &config.parameters {
        let names = exc_names(parameters)?;
        builder = builder.parameters(&ParameterMap::load(&parameters.exc, names.as_ref())?);
        for path in &parameters.overrides {
            builder = builder.parameter_overrides(&ParameterMap::load(path, names.as_ref())?);
        }
    }

    if let Some(path) = &config.sources.lv_range_map {
        // only the records' keys matter here, not their files
        let records = load_records(path, &SourceRoot::lexical(""))?;
        builder = builder.local_variables(&records, config.sources.lv_fallback_package.as_deref());
    }

    Ok(builder.build())
}

fn exc_names(parameters: &Parameters) -> Result<Option<ExcNames>, MappingError> {
    if parameters.method_names.is_none() && parameters.param_names.is_none() {
        return Ok(None);
    }
    Ok(Some(ExcNames {
        methods: parameters
            .method_names
            .as_ref()
            .map(load_csv_map)
            .transpose()?
            .unwrap_or_default(),
        params: parameters
            .param_names
            .as_ref()
            .map(load_csv_map)
            .transpose()?
            .unwrap_or_default(),
    }))
}
