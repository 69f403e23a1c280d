use clap::Parser;
use parcel_valuation::utils::error::{ErrorSeverity, ValuationError};
use parcel_valuation::utils::{logger, validation::Validate};
use parcel_valuation::{
    load_valuator, CliConfig, LocalStorage, ValuationPipeline, ValuationRunner,
};
use std::sync::Arc;

fn exit_code(e: &ValuationError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &ValuationError) {
    tracing::error!(
        "Valuation run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("Error: {}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting parcel-valuation CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("Error: {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let valuator = match load_valuator(&storage, &config.catalog, &config.territories).await {
        Ok(valuator) => Arc::new(valuator),
        Err(e) => {
            report_failure(&e);
            std::process::exit(exit_code(&e));
        }
    };

    let pipeline = ValuationPipeline::new(storage, config, valuator);
    let runner = ValuationRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(output_path) => {
            tracing::info!("Valuation run completed successfully");
            println!("Valuation run completed successfully");
            println!("Output saved to: {}", output_path);
        }
        Err(e) => {
            report_failure(&e);
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
