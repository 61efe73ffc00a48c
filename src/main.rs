use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;

use gtcedit::{Blocks, ConfigError, Driver, EventLog, Manifest, OverrideSet, Result};

/// Bulk editing of binary genotype call (GTC) records against a probe manifest
#[derive(Parser, Debug)]
#[command(name = "gtcedit", version, about)]
struct Args {
    /// Full path to the binary bead pool manifest (.bpm); must be the one
    /// used to generate the records
    #[arg(long)]
    manifest: PathBuf,

    /// Full path to the manifest-in-CSV form supplying forward-strand
    /// allele pairs
    #[arg(long)]
    manifest_csv: PathBuf,

    /// Directory containing the source .gtc records
    #[arg(long, default_value = ".")]
    gtc_dir: PathBuf,

    /// Directory to write updated records into; created when missing, and
    /// must not already contain .gtc files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Update script listing source records, metadata assignments, and
    /// SNP edits
    #[arg(long)]
    updates: PathBuf,

    /// Tab-separated file of snp name and replacement allele string,
    /// applied to the manifest for this run only
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Number of worker threads for batch processing
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Route the log stream to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// The output directory must exist and hold no .gtc files from a previous run.
fn prepare_out_dir(out_dir: &Path) -> Result<()> {
    if !out_dir.exists() {
        std::fs::create_dir_all(out_dir)?;
        return Ok(());
    }
    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "gtc") {
            return Err(ConfigError::DirtyOutputDir(out_dir.to_path_buf()).into());
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    prepare_out_dir(&args.out_dir)?;

    let mut events = EventLog::new();
    info!("Preparing to read manifest files...");
    let mut manifest = Manifest::from_paths(&args.manifest, &args.manifest_csv)?;
    info!("Successfully loaded {} markers", manifest.len());

    match &args.overrides {
        Some(path) => {
            info!("Override file present");
            let overrides = OverrideSet::from_path(path, &mut events)?;
            manifest = manifest.with_overrides(&overrides, &mut events);
        }
        None => info!("No overrides present"),
    }

    let script = File::open(&args.updates).map(BufReader::new)?;
    let driver = Driver::new(&manifest, &args.gtc_dir, &args.out_dir).threads(args.threads);
    let summary = driver.run(Blocks::new(script), &mut events)?;

    info!("All processing is finished!");
    println!(
        "{} records written, {} batches aborted, {} failed validation",
        summary.written, summary.aborted, summary.validation_failures
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_logging(&args) {
        eprintln!("gtcedit: {err}");
        return ExitCode::FAILURE;
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("gtcedit: {err}");
            ExitCode::FAILURE
        }
    }
}
