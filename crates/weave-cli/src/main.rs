use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use weave_core::{
    ApplyReport, Catalog, GeneratorRegistry, InjectionEngine, RunMode, UnknownGeneratorPolicy,
    WeaveConfig,
};

#[derive(Parser)]
#[command(name = "weave", author, version, about = "Expand and strip marker-delimited generated code", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Options {
    /// Directory to search for source files
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// File extension to process (repeatable, defaults to WEAVE_EXTENSIONS or pyx,pxd)
    #[arg(long = "ext", global = true)]
    extensions: Vec<String>,

    /// Type catalog file (.yaml, .yml or .json), defaults to the built-in MDS catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory of extra *.hbs templates; these take precedence over built-ins
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Fail a file whose directive names an unregistered generator
    #[arg(long, global = true)]
    strict_generators: bool,

    /// Print the planned files instead of writing them
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the contents of every injection region
    Generate,

    /// Strip every injection region back to its markers
    Clean,

    /// Report files whose generated regions are out of date
    Check,

    /// List registered generators and catalog categories
    List,
}

fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let engine = build_engine(&cli.options)?;

    match cli.command {
        Commands::Generate => run(&engine, &cli.options, RunMode::Generate),
        Commands::Clean => run(&engine, &cli.options, RunMode::Clean),
        Commands::Check => check(&engine, &cli.options),
        Commands::List => list(&engine),
    }
}

fn build_engine(options: &Options) -> Result<InjectionEngine> {
    let mut config = WeaveConfig::from_env().context("Invalid WEAVE_* environment")?;
    if !options.extensions.is_empty() {
        config = config.with_extensions(options.extensions.iter().map(String::as_str));
    }
    if options.strict_generators {
        config = config.with_unknown_generator(UnknownGeneratorPolicy::Error);
    }

    let catalog = match &options.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => weave_templates::builtin_catalog().context("Built-in catalog is invalid")?,
    };

    let mut builder = GeneratorRegistry::builder();
    if let Some(dir) = &options.templates {
        let count = weave_templates::register_template_dir(&mut builder, dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
        info!("Loaded {} templates from {}", count, dir.display());
    }
    weave_templates::register_builtins(&mut builder)?;

    let engine = InjectionEngine::new(config, catalog, builder.build())?;
    debug!(
        "Engine ready: {} categories, {} generators",
        engine.catalog().len(),
        engine.registry().len()
    );
    Ok(engine)
}

fn sources(engine: &InjectionEngine, root: &Path) -> Result<Vec<PathBuf>> {
    let files = weave_core::discover(root, &engine.config().extensions)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    info!(
        "Found {} source files under {} ({})",
        files.len(),
        root.display(),
        engine.config().extensions.join(", ")
    );
    Ok(files)
}

fn run(engine: &InjectionEngine, options: &Options, mode: RunMode) -> Result<()> {
    let files = sources(engine, &options.root)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = engine
        .apply_all(&files, options.dry_run, mode, &mut out)
        .context("Run aborted, no files were modified")?;
    out.flush()?;

    summarize(&report)
}

fn summarize(report: &ApplyReport) -> Result<()> {
    for (path, line) in &report.unterminated {
        warn!("{}: start marker on line {} has no end marker", path.display(), line);
    }
    for (path, err) in &report.failures {
        error!("{}: {}", path.display(), err);
    }

    if !report.is_success() {
        bail!("{} file(s) failed", report.failures.len());
    }
    Ok(())
}

fn check(engine: &InjectionEngine, options: &Options) -> Result<()> {
    let files = sources(engine, &options.root)?;
    let report = engine.check(&files).context("Check aborted")?;

    for path in &report.stale {
        println!("{}", path.display());
    }
    for (path, err) in &report.failures {
        error!("{}: {}", path.display(), err);
    }

    if !report.is_clean() {
        bail!(
            "{} stale file(s), {} failed",
            report.stale.len(),
            report.failures.len()
        );
    }
    info!("All {} files are up to date", report.fresh.len());
    Ok(())
}

fn list(engine: &InjectionEngine) -> Result<()> {
    println!("Generators:");
    for name in engine.registry().names() {
        println!("  {}", name);
    }

    println!("Categories:");
    for category in engine.catalog().categories() {
        let labels: Vec<_> = category.entries().map(|(label, _)| label).collect();
        println!("  {} ({}): {}", category.name(), category.len(), labels.join(", "));
    }
    Ok(())
}
