//! Injection Engine - applies scanning and splicing to files on disk.
//!
//! Per file: read → scan (resolving directives) → splice → preview or persist.
//! Across files: every file is planned before any file is written, so a
//! run-fatal error leaves the tree untouched.

use crate::{
    scan, splice, Catalog, CleanStrategy, DirectiveResolver, FileRewritePlan, GenerateStrategy,
    GeneratorRegistry, MarkerSyntax, Result, RunMode, WeaveConfig, WeaveError,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// The engine that expands and strips injection regions.
///
/// # Example
///
/// ```rust,ignore
/// use weave_core::{Catalog, GeneratorRegistry, InjectionEngine, RunMode, WeaveConfig};
///
/// let engine = InjectionEngine::new(WeaveConfig::default(), catalog, registry)?;
/// let files = weave_core::discover(".", &engine.config().extensions)?;
/// let report = engine.apply_all(&files, false, RunMode::Generate, &mut std::io::stdout())?;
/// ```
#[derive(Debug)]
pub struct InjectionEngine {
    config: WeaveConfig,
    markers: MarkerSyntax,
    catalog: Catalog,
    registry: GeneratorRegistry,
}

/// A file's planned rewrite.
#[derive(Debug, Clone)]
pub struct FilePlan {
    /// The file.
    pub path: PathBuf,
    /// Content read from disk.
    pub original: String,
    /// Content after splicing.
    pub plan: FileRewritePlan,
    /// Number of complete regions.
    pub regions: usize,
    /// 1-based line of an unclosed start marker, if any.
    pub unterminated: Option<usize>,
}

impl FilePlan {
    /// The planned file content.
    pub fn content(&self) -> String {
        self.plan.content()
    }

    /// Whether applying the plan would change the file.
    pub fn is_changed(&self) -> bool {
        self.content() != self.original
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// No complete regions; the file was not written.
    Untouched,
    /// Dry run; the plan was printed.
    Previewed,
    /// The file was rewritten.
    Rewritten,
    /// The plan matched the file, so it was not written.
    Unchanged,
}

/// Summary of a multi-file run.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub rewritten: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub untouched: Vec<PathBuf>,
    pub previewed: Vec<PathBuf>,
    /// Files whose start marker on the given line was never closed.
    pub unterminated: Vec<(PathBuf, usize)>,
    /// Files that could not be processed. Nothing was written for them.
    pub failures: Vec<(PathBuf, WeaveError)>,
}

impl ApplyReport {
    /// True when no file failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Untouched => self.untouched.push(path),
            FileOutcome::Previewed => self.previewed.push(path),
            FileOutcome::Rewritten => self.rewritten.push(path),
            FileOutcome::Unchanged => self.unchanged.push(path),
        }
    }
}

/// Result of checking files against what generation would produce.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Files whose generated content is out of date.
    pub stale: Vec<PathBuf>,
    /// Files that are up to date.
    pub fresh: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, WeaveError)>,
}

impl CheckReport {
    /// True when every file is up to date and none failed.
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty() && self.failures.is_empty()
    }
}

impl InjectionEngine {
    /// Create an engine. The catalog and registry are frozen from here on.
    pub fn new(config: WeaveConfig, catalog: Catalog, registry: GeneratorRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            markers: config.markers(),
            config,
            catalog,
            registry,
        })
    }

    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// The resolver for a run mode.
    pub fn resolver(&self, mode: RunMode) -> Box<dyn DirectiveResolver + '_> {
        match mode {
            RunMode::Generate => Box::new(
                GenerateStrategy::new(self.markers.separator, &self.catalog, &self.registry)
                    .with_policy(self.config.unknown_generator),
            ),
            RunMode::Clean => Box::new(CleanStrategy),
        }
    }

    /// Plan a file with an explicit resolver. `None` when the file has no
    /// complete regions.
    pub fn plan_with(&self, path: &Path, resolver: &dyn DirectiveResolver) -> Result<Option<FilePlan>> {
        let original = fs::read_to_string(path)?;
        let lines: Vec<&str> = original.split_inclusive('\n').collect();

        let scan = scan(&lines, &self.markers, resolver)?;
        if scan.regions.is_empty() {
            debug!(path = %path.display(), "No injection regions");
            return Ok(None);
        }

        let plan = splice(&lines, &scan.regions)?;
        let regions = scan.regions.len();
        let unterminated = scan.unterminated;

        Ok(Some(FilePlan {
            path: path.to_path_buf(),
            original,
            plan,
            regions,
            unterminated,
        }))
    }

    /// Plan a file for a run mode.
    pub fn plan(&self, path: &Path, mode: RunMode) -> Result<Option<FilePlan>> {
        self.plan_with(path, self.resolver(mode).as_ref())
    }

    /// Plan and then preview or persist one file.
    #[instrument(skip_all, fields(path = %path.display(), dry_run = dry_run))]
    pub fn apply_with(
        &self,
        path: &Path,
        dry_run: bool,
        resolver: &dyn DirectiveResolver,
        out: &mut dyn Write,
    ) -> Result<FileOutcome> {
        match self.plan_with(path, resolver)? {
            Some(plan) => self.commit(&plan, dry_run, out),
            None => Ok(FileOutcome::Untouched),
        }
    }

    /// [`apply_with`](Self::apply_with) using the strategy for `mode`.
    pub fn apply(&self, path: &Path, dry_run: bool, mode: RunMode, out: &mut dyn Write) -> Result<FileOutcome> {
        self.apply_with(path, dry_run, self.resolver(mode).as_ref(), out)
    }

    /// Apply `mode` to every path, in sorted order.
    ///
    /// All files are planned first. A run-fatal error aborts before anything
    /// is written; other errors skip their file and are collected in the
    /// report.
    #[instrument(skip_all, fields(mode = %mode, dry_run = dry_run, files = paths.len()))]
    pub fn apply_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
        dry_run: bool,
        mode: RunMode,
        out: &mut dyn Write,
    ) -> Result<ApplyReport> {
        info!("Injecting sources (mode: {}, simulated: {})", mode, dry_run);

        let resolver = self.resolver(mode);
        let mut report = ApplyReport::default();
        let mut plans = Vec::new();

        for path in sorted(paths) {
            if dry_run {
                info!("Evaluating {}", path.display());
            }

            match self.plan_with(&path, resolver.as_ref()) {
                Ok(Some(plan)) => {
                    if let Some(line) = plan.unterminated {
                        report.unterminated.push((path.clone(), line));
                    }
                    plans.push(plan);
                }
                Ok(None) => report.record(path, FileOutcome::Untouched),
                Err(e) if e.is_run_fatal() => return Err(e.in_file(path)),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.failures.push((path, e));
                }
            }
        }

        for plan in &plans {
            match self.commit(plan, dry_run, out) {
                Ok(outcome) => report.record(plan.path.clone(), outcome),
                Err(e) => {
                    warn!("Failed to write {}: {}", plan.path.display(), e);
                    report.failures.push((plan.path.clone(), e));
                }
            }
        }

        info!(
            "Done: {} rewritten, {} unchanged, {} without regions, {} previewed, {} failed",
            report.rewritten.len(),
            report.unchanged.len(),
            report.untouched.len(),
            report.previewed.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Compare every file against its generated plan without writing.
    ///
    /// Run-fatal errors abort the check just like a real run.
    pub fn check<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CheckReport> {
        let resolver = self.resolver(RunMode::Generate);
        let mut report = CheckReport::default();

        for path in sorted(paths) {
            match self.plan_with(&path, resolver.as_ref()) {
                Ok(Some(plan)) if plan.is_changed() => report.stale.push(path),
                Ok(_) => report.fresh.push(path),
                Err(e) if e.is_run_fatal() => return Err(e.in_file(path)),
                Err(e) => report.failures.push((path, e)),
            }
        }

        Ok(report)
    }

    fn commit(&self, plan: &FilePlan, dry_run: bool, out: &mut dyn Write) -> Result<FileOutcome> {
        if dry_run {
            writeln!(out, "{}", plan.path.display())?;
            out.write_all(plan.content().as_bytes())?;
            return Ok(FileOutcome::Previewed);
        }

        let content = plan.content();
        if self.config.skip_unchanged && content == plan.original {
            debug!(path = %plan.path.display(), "Content unchanged, not writing");
            return Ok(FileOutcome::Unchanged);
        }

        write_whole_file(&plan.path, &content)?;
        info!(
            "Wrote {} ({} regions, {} blocks)",
            plan.path.display(),
            plan.regions,
            plan.plan.generated_blocks()
        );
        Ok(FileOutcome::Rewritten)
    }
}

fn sorted<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    paths.sort();
    paths.dedup();
    paths
}

/// Replace a file's content in one step: write a sibling temp file, copy
/// the permissions over, then rename it into place.
fn write_whole_file(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
