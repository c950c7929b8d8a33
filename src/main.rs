use clap::Parser;
use payslip_recon::core::report::render_text;
use payslip_recon::utils::{logger, validation::Validate};
use payslip_recon::{CliConfig, FilePipeline, LocalStorage, ReconRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init(config.verbose, config.log_json);

    tracing::info!("Starting payslip-recon CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.base_dir.clone());
    let pipeline = FilePipeline::new(storage, config);
    let runner = ReconRunner::new(pipeline);

    match runner.run().await {
        Ok(report) => {
            print!("{}", render_text(&report));
            if !report.passed() {
                tracing::warn!("❌ Failing checks: {:?}", report.failed_checks());
            }
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
