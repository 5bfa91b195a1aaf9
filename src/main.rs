use clap::Parser;
use research_framework::core::tasks::{load_tasks_file, sample_tasks};
use research_framework::core::export::render_console_summary;
use research_framework::core::ConfigProvider;
use research_framework::utils::{logger, validation::Validate};
use research_framework::{
    CliConfig, FrameworkError, LocalStorage, ReportExporter, ResearchEngine, ResearchFramework,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting research-framework CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(e);
    }

    let tasks = match &config.tasks {
        Some(path) => match load_tasks_file(path).await {
            Ok(tasks) => tasks,
            Err(e) => fail(e),
        },
        None => sample_tasks(config.framework_id(), config.sample_tasks),
    };

    let exporter = config
        .output_path()
        .map(|path| ReportExporter::new(LocalStorage::new(path), config.output_formats()));

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine =
        ResearchEngine::new_with_monitoring(ResearchFramework::new(config.clone()), config.monitor);
    let summary = engine.run(tasks).await;

    println!("{}", render_console_summary(&summary)?);

    if let Some(exporter) = exporter {
        if let Err(e) = exporter.export(&summary).await {
            fail(e);
        }
    }

    println!(
        "✅ Research framework {} execution completed",
        config.framework_id()
    );

    Ok(())
}

fn fail(e: FrameworkError) -> ! {
    tracing::error!(
        "❌ Research run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}
