//! CLI tool for buildtier

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use colored::Colorize;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use buildtierlib::{
    config::ComplianceConfig, loader, observer::LogObserver, pipeline::run_compliance, report,
    BuildRecord, BuildTierError, ComplianceReport,
};

#[cfg(feature = "cli")]
const DEFAULT_OUTPUT_FILE: &str = "./outputs/desktop-build-statistics.csv";
#[cfg(feature = "cli")]
const DEFAULT_INVENTORY_FILE: &str = "./inputs/syncro-data.csv";
#[cfg(feature = "cli")]
const DEFAULT_BUILDS_FILE: &str = "./outputs/windows-builds.csv";

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "buildtier")]
#[command(about = "Desktop build compliance: current, aging and disallowed Windows builds across a fleet", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enables debug level logging
    #[arg(long, global = true)]
    debug_logging: bool,

    /// Enables info level logging. Superseded by --debug-logging
    #[arg(long, global = true)]
    info_logging: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Classify the deployed inventory and write the compliance report
    Report {
        /// Path to configuration file (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inventory roster CSV exported from the RMM
        #[arg(short, long, default_value = DEFAULT_INVENTORY_FILE)]
        inventory: PathBuf,

        /// Saved vendor build list; release pages are fetched when omitted
        #[arg(short, long)]
        builds: Option<PathBuf>,

        /// Where to write the report CSV
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Append today's date to the report file name
        #[arg(long)]
        dated: bool,

        /// Also write intermediate structures as JSON into this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },
    /// Fetch vendor release pages and save the build list as CSV
    Fetch {
        /// Path to configuration file (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the build list
        #[arg(short, long, default_value = DEFAULT_BUILDS_FILE)]
        output: PathBuf,
    },
    /// Print a sample configuration file
    SampleConfig,
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.debug_logging {
        logger.filter_level(log::LevelFilter::Debug);
    } else if cli.info_logging {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match cli.command {
        Commands::Report {
            config,
            inventory,
            builds,
            output,
            dated,
            dump_dir,
        } => {
            let config = load_config(config.as_deref())?;
            handle_report(&config, &inventory, builds.as_deref(), &output, dated, dump_dir.as_deref())?;
        }
        Commands::Fetch { config, output } => {
            let config = load_config(config.as_deref())?;
            let records = fetch_builds(&config)?;
            report::write_build_records_csv(&output, &records)?;
            println!(
                "{} {} build records → {}",
                "[+]".green(),
                records.len(),
                output.display()
            );
        }
        Commands::SampleConfig => {
            print!("{}", ComplianceConfig::sample_toml());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<ComplianceConfig, BuildTierError> {
    match path {
        Some(p) => {
            log::info!("loading configuration from {}", p.display());
            ComplianceConfig::from_toml_file(p)
        }
        None => Ok(ComplianceConfig::default()),
    }
}

#[cfg(all(feature = "cli", feature = "fetch"))]
fn fetch_builds(config: &ComplianceConfig) -> Result<Vec<BuildRecord>, BuildTierError> {
    buildtierlib::feed::fetch_all(&config.os_checks, &mut LogObserver)
}

#[cfg(all(feature = "cli", not(feature = "fetch")))]
fn fetch_builds(_config: &ComplianceConfig) -> Result<Vec<BuildRecord>, BuildTierError> {
    Err(BuildTierError::Configuration(
        "fetching release pages requires the `fetch` feature; pass --builds instead".into(),
    ))
}

/// Handle the report command
#[cfg(feature = "cli")]
fn handle_report(
    config: &ComplianceConfig,
    inventory: &Path,
    builds: Option<&Path>,
    output: &Path,
    dated: bool,
    dump_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = config.tier_policy()?;
    let vendor = match builds {
        Some(path) => loader::load_build_records(path, &mut LogObserver)?,
        None => fetch_builds(config)?,
    };
    let roster = loader::load_inventory(inventory, &config.inventory_build_column)?;

    let result = run_compliance(&vendor, &roster, policy, &mut LogObserver)?;

    let output = if dated {
        report::dated_report_path(output, chrono::Local::now().date_naive())
    } else {
        output.to_path_buf()
    };
    report::write_report_csv(&output, &result.stats)?;
    if let Some(dir) = dump_dir {
        report::dump_intermediates(dir, &result)?;
    }

    print_summary(&result);
    println!("\n{} report written to {}", "[+]".green(), output.display());
    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(result: &ComplianceReport) {
    println!("{}", "═══ Build Compliance ═══".cyan().bold());
    println!(
        "  {} current ≤ {}, aging ≤ {} per feature release",
        "Policy:".white().bold(),
        result.policy.current_count(),
        result.policy.aging_count()
    );

    let rows = report::report_rows(&result.stats);
    if rows.is_empty() {
        println!("  {}", "No deployed machines matched the vendor catalog".yellow());
    }
    for row in rows {
        println!(
            "  {:<12} {:<6} {:>6} {:>6} {:>6}  {:>5.1}%",
            row.os_major_version,
            row.feature_release_version,
            row.counts.current.to_string().green(),
            row.counts.aging.to_string().yellow(),
            row.counts.disallowed.to_string().red(),
            row.counts.compliance_percent()
        );
    }

    let dropped = result.inventory.unmatched_machines();
    if dropped > 0 {
        println!(
            "  {} {} machine(s) on builds not in the vendor catalog",
            "[!]".yellow(),
            dropped
        );
        for (build, machines) in &result.inventory.unmatched {
            let assets = result
                .inventory
                .unmatched_assets
                .get(build)
                .map(|names| names.join(", "))
                .unwrap_or_default();
            println!("      {:<16} {:>4}  {}", build, machines, assets.dimmed());
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
