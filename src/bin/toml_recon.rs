use anyhow::Context;
use clap::Parser;
use payslip_recon::core::report::render_text;
use payslip_recon::core::ConfigProvider;
use payslip_recon::utils::{logger, validation::Validate};
use payslip_recon::{FilePipeline, LocalStorage, MappingTable, ReconRunner, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-recon")]
#[command(about = "Payroll reconciliation driven by a TOML run file")]
struct Args {
    /// Path to TOML run file
    #[arg(short, long, default_value = "recon.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override the checks listed in the run file
    #[arg(long, value_delimiter = ',')]
    checks: Option<Vec<String>>,

    /// Validate the run file and mapping without running any checks
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(args.verbose, args.log_json);

    tracing::info!("🚀 Starting TOML-based reconciliation");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(checks) = args.checks {
        tracing::info!("🔧 Checks overridden to: {}", checks.join(", "));
        config.checks.enabled = checks;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no checks will run");
        return perform_dry_run(&config);
    }

    let storage = LocalStorage::new(config.base_dir().to_string());
    let pipeline = FilePipeline::new(storage, config);
    let runner = ReconRunner::new(pipeline);

    match runner.run().await {
        Ok(report) => {
            print!("{}", render_text(&report));
            std::process::exit(report.exit_code());
        }
        Err(e) => {
            tracing::error!(
                "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Run Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Base dir: {}", config.base_dir());
    println!("  GTN: {}", config.gtn_path());
    println!("  Payrun: {}", config.payrun_path());
    println!("  Mapping: {}", config.mapping_path());
    println!(
        "  Checks: {}",
        config
            .enabled_checks()
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Output: {} ({})", config.output_path(), config.report_formats().join(", "));
    println!();
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let storage = LocalStorage::new(config.base_dir().to_string());
    let mapping_path = storage.resolve(config.mapping_path());

    let mapping = MappingTable::from_file(&mapping_path)
        .with_context(|| format!("reading mapping {}", mapping_path.display()))?;
    println!("🔄 Mapping: {} entries, {} exemptions", mapping.len(), mapping.exemptions().count());

    for path in [config.gtn_path(), config.payrun_path()] {
        let resolved = storage.resolve(path);
        let status = if resolved.exists() { "found" } else { "MISSING" };
        println!("📄 {}: {}", resolved.display(), status);
    }

    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
