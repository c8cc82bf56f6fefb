use clap::Parser;
use rf_sheet_builder::core::Storage;
use rf_sheet_builder::utils::error::ErrorSeverity;
use rf_sheet_builder::utils::{logger, validation::Validate};
use rf_sheet_builder::{CliConfig, EtlEngine, LocalStorage, ReportSettings, SheetPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting rf-sheet-builder");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match cli.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(settings.folder.clone());

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be parsed or written");
        perform_dry_run(&settings, &storage).await?;
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = SheetPipeline::new(storage, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Report built from {} records",
                summary.records_extracted
            );
            println!(
                "Done. Wrote {} rows into: {}",
                summary.rows_written, summary.output_path
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Report build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn perform_dry_run(settings: &ReportSettings, storage: &LocalStorage) -> anyhow::Result<()> {
    println!("📋 Configuration Summary:");
    println!("  Folder: {}", settings.folder);
    println!("  Pattern: {}", settings.pattern);
    println!("  Output: {}", settings.output_path);
    println!("  Tests: {}", settings.tests.join(", "));

    match &settings.channels_keep {
        Some(channels) if !channels.is_empty() => {
            println!("  Channels:");
            for (band, list) in channels.bands() {
                if list.is_empty() {
                    println!("    {}: all", band);
                } else {
                    println!("    {}: {}", band, list.join(", "));
                }
            }
        }
        _ => println!("  Channels: all"),
    }

    println!();
    let files = storage.list_files(&settings.pattern).await?;
    println!("📁 {} input file(s):", files.len());
    for file in &files {
        println!("  {}", file);
    }

    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
