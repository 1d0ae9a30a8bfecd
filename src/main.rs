use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use symbol_remap::mapping::{chain, describe, render_srg, DescriptiveNames, MappingSet};
use symbol_remap::remapper::build_tables;
use symbol_remap::{RemapConfig, RemapError, RemappedFile, Remapper, RunSummary};

#[derive(Parser)]
#[command(name = "symbol-remap")]
#[command(about = "Namespace-wide symbol renaming for Java source trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every rename and unresolved symbol
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename symbols throughout a source tree
    Apply {
        /// Run configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Dry run - compute every rewrite without touching files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Chain two mappings sharing an old namespace into one A → B mapping
    Chain {
        /// First mapping (old → A)
        first: PathBuf,

        /// Second mapping (old → B), or "-" to emit old → descriptive A names
        second: String,

        /// Read the first mapping new → old
        #[arg(long)]
        reverse_first: bool,

        /// Read the second mapping new → old
        #[arg(long)]
        reverse_second: bool,

        /// Directory with fields.csv and methods.csv descriptive names
        ///
        /// Either mapping may also be a conf directory holding packaged.srg
        /// (or server.srg) next to those files; the B-side directory, or the
        /// first one when chaining against "-", then supplies the names.
        #[arg(long)]
        descriptive: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the rename table a configuration produces
    Dump {
        /// Run configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Apply {
            config,
            dry_run,
            diff,
        } => cmd_apply(&config, dry_run, diff),

        Commands::Chain {
            first,
            second,
            reverse_first,
            reverse_second,
            descriptive,
            output,
        } => cmd_chain(
            &first,
            &second,
            reverse_first,
            reverse_second,
            descriptive.as_deref(),
            output.as_deref(),
        ),

        Commands::Dump { config } => cmd_dump(&config),
    }
}

/// Fatal run errors carry their category into the message.
fn fatal(error: RemapError) -> anyhow::Error {
    let kind = error.kind();
    anyhow::Error::new(error).context(format!("{kind} error"))
}

fn load_mapping(path: &Path, reverse: bool) -> Result<MappingSet> {
    let set = MappingSet::load(path).map_err(|e| fatal(e.into()))?;
    Ok(if reverse { set.reversed() } else { set })
}

/// Helper: Show unified diff between original and rewritten content
fn display_diff(file: &RemappedFile) {
    let target = file.relocation.as_deref().unwrap_or(&file.file);
    println!("\n{}", format!("--- {} (original)", file.file).dimmed());
    println!("{}", format!("+++ {} (remapped)", target).dimmed());

    let diff = TextDiff::from_lines(&file.original, &file.content);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} files processed", summary.files);
    println!("  {} changed", format!("{}", summary.changed).green());
    println!("  {} symbols renamed", summary.renamed);
    println!("  {} imports added", summary.imports_added);
    println!("  {} files moved", format!("{}", summary.relocated).green());
    println!("  {} skipped", format!("{}", summary.skipped).cyan());
}

fn cmd_apply(config_path: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let config = RemapConfig::load(config_path).map_err(|e| fatal(e.into()))?;
    println!("Config: {}", config_path.display());
    println!("Source root: {}", config.sources.src_root.display());
    println!();

    let remapper = Remapper::new(config).map_err(fatal)?;

    if remapper.config().output.dump_rename_map {
        let stdout = io::stdout();
        remapper.tables().write_dump(stdout.lock())?;
    }

    let plan = remapper.plan().map_err(fatal)?;

    if show_diff {
        for file in plan.changed() {
            display_diff(file);
        }
    }

    let summary = if dry_run {
        println!("{}", "[DRY RUN - no files were modified]".cyan());
        plan.summary()
    } else {
        remapper.persist(&plan).map_err(fatal)?
    };

    print_summary(&summary);
    Ok(())
}

/// A mapping argument: an SRG file, or a conf directory whose mapping is
/// loaded and whose CSVs can supply descriptive names.
fn mapping_source(path: &Path) -> Result<(PathBuf, Option<&Path>)> {
    if path.is_dir() {
        let srg = MappingSet::find_in_conf(path).map_err(|e| fatal(e.into()))?;
        Ok((srg, Some(path)))
    } else {
        Ok((path.to_path_buf(), None))
    }
}

fn cmd_chain(
    first: &Path,
    second: &str,
    reverse_first: bool,
    reverse_second: bool,
    descriptive: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let (first, first_conf) = mapping_source(first)?;
    let a = load_mapping(&first, reverse_first)?;

    let (b, conf) = if second == "-" {
        (None, first_conf)
    } else {
        let (second, second_conf) = mapping_source(Path::new(second))?;
        (Some(load_mapping(&second, reverse_second)?), second_conf)
    };

    let overlay = descriptive
        .or(conf)
        .map(DescriptiveNames::load_dir)
        .transpose()
        .map_err(|e| fatal(e.into()))?;

    let chained = match &b {
        Some(b) => chain(&a, b, overlay.as_ref()),
        None => {
            let overlay =
                overlay.context("chaining against '-' needs --descriptive or a conf directory")?;
            describe(&a, &overlay)
        }
    };

    let rendered = render_srg(&chained);
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn cmd_dump(config_path: &Path) -> Result<()> {
    let config = RemapConfig::load(config_path).map_err(|e| fatal(e.into()))?;
    let tables = build_tables(&config).map_err(fatal)?;
    let stdout = io::stdout();
    tables.write_dump(stdout.lock())?;
    Ok(())
}
