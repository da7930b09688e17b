use anyhow::{anyhow, Context, Result};
use depcache::{DependencyCache, MergeOutcome};
use model::SourceModel;
use parsers::{analyze_file, canonical, dup_hash, ParserMetrics};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};

use crate::args::Cli;
use crate::config::{load_config, Config};

/// Stack reserved for the analysis thread. Lowering, resolution and model
/// building recurse once per tree level.
const ANALYSIS_STACK_SIZE: usize = 256 * 1024 * 1024;

fn init_logging(args: &Cli) {
    let level = if args.quiet {
        LevelFilter::OFF
    } else if args.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    if args.debug && !args.quiet {
        debug!("Debug mode enabled");
    }
}

/// Context arguments that are Java sources. Anything else (class path
/// entries, compiler options) is ignored.
fn context_sources(args: &[PathBuf]) -> Vec<PathBuf> {
    args.iter()
        .filter(|p| {
            let is_java = p.extension().is_some_and(|e| e == "java");
            if !is_java {
                debug!(arg = %p.display(), "ignoring non-source context argument");
            }
            is_java
        })
        .cloned()
        .collect()
}

/// Analyzes one source file: writes its model document, optionally its
/// duplicate hashes, and records its imports in the dependency cache.
pub fn run_analysis(args: Cli) -> Result<()> {
    init_logging(&args);
    let cfg = load_config().context("failed to load configuration")?;
    info!(file = %args.source.display(), "Analysis started");
    let worker = thread::Builder::new()
        .name("analysis".into())
        .stack_size(ANALYSIS_STACK_SIZE)
        .spawn(move || analyze(&args, &cfg))
        .context("failed to start analysis thread")?;
    worker
        .join()
        .map_err(|_| anyhow!("analysis thread panicked"))?
}

fn analyze(args: &Cli, cfg: &Config) -> Result<()> {
    let mut metrics = ParserMetrics::default();
    let context = context_sources(&args.context);
    let unit = analyze_file(&args.source, &context, Some(&mut metrics))?;
    let model = builder::build_model(&unit.tree, &unit.resolver, unit.path());

    let out_file = write_model(&model, args, cfg)?;
    if args.dups {
        let path = writer::dups_file_name(&out_file, &cfg.output.dups_dir);
        dup_hash::write_dup_hashes(&unit.source, &path)?;
        info!(output = %path.display(), "Duplicate hashes written");
    }
    update_cache(&model, args, cfg);

    if let Some(path) = &args.dump_model {
        let json = model.to_json().context("failed to serialize model")?;
        write_dump(path, &json)?;
    }
    if let Some(path) = &args.dump_tree {
        let json = unit.tree.to_json().context("failed to serialize tree")?;
        write_dump(path, &json)?;
    }

    debug!(
        metrics = %serde_json::to_string(&metrics).unwrap_or_default(),
        "Parser metrics"
    );
    info!(types = model.type_count(), "Analysis completed");
    Ok(())
}

fn write_model(model: &SourceModel, args: &Cli, cfg: &Config) -> Result<PathBuf> {
    let out_file = writer::output_file_name(
        Path::new(&model.module.path),
        &args.source_root,
        &args.output_dir,
        &cfg.output.extension,
    );
    writer::write_document(model, &out_file)
        .with_context(|| format!("Unable to write {}", out_file.display()))?;
    info!(output = %out_file.display(), "Model written");
    Ok(out_file)
}

/// Merges the imports into the shared cache. Failures only warn: the model
/// document is already written.
fn update_cache(model: &SourceModel, args: &Cli, cfg: &Config) {
    let cache = DependencyCache::new(args.output_dir.join(&cfg.cache.file_name))
        .with_policy(cfg.cache.retry_policy());
    let root = canonical(&args.source_root);
    match cache.merge(&model.module.path, &model.module.imports, &root) {
        Ok(MergeOutcome::Updated) => {
            debug!(cache = %cache.path().display(), "Dependency cache updated")
        }
        Ok(outcome) => debug!(?outcome, "Dependency cache not changed"),
        Err(e) => warn!(error = %e, "Dependency cache update failed"),
    }
}

fn write_dump(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(output = %path.display(), "Debug dump written");
    Ok(())
}
