use clap::Parser;
use research_framework::core::tasks::{load_tasks_file, sample_tasks};
use research_framework::core::export::render_console_summary;
use research_framework::core::ConfigProvider;
use research_framework::utils::{logger, validation::Validate};
use research_framework::{
    FrameworkError, LocalStorage, ReportExporter, ResearchEngine, ResearchFramework, TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-research")]
#[command(about = "Research framework driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "research.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override execution.max_workers from config
    #[arg(long)]
    max_workers: Option<usize>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting TOML-based research framework");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}'", args.config);
            fail(e);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(max_workers) = args.max_workers {
        config.execution.max_workers = Some(max_workers);
        tracing::info!("🔧 max_workers overridden to: {}", max_workers);
    }

    if let Err(e) = config.validate() {
        fail(e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let tasks = match config.task_file() {
        Some(path) => match load_tasks_file(path).await {
            Ok(tasks) => tasks,
            Err(e) => fail(e),
        },
        None => sample_tasks(config.framework_id(), config.sample_count()),
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config, tasks.len());
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let exporter = config
        .output_path()
        .map(|path| ReportExporter::new(LocalStorage::new(path), config.output_formats()));

    let engine = ResearchEngine::new_with_monitoring(ResearchFramework::new(config), monitor_enabled);
    let summary = engine.run(tasks).await;

    println!("{}", render_console_summary(&summary)?);

    if let Some(exporter) = exporter {
        match exporter.export(&summary).await {
            Ok(files) => println!("📁 Reports written: {}", files.join(", ")),
            Err(e) => fail(e),
        }
    }

    let completed = summary.outcomes.iter().filter(|o| o.is_completed()).count();
    println!(
        "✅ {} of {} tasks completed",
        completed,
        summary.outcomes.len()
    );

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Framework: {} #{} v{}",
        config.category(),
        config.framework_id(),
        config.version()
    );
    println!("  Max Workers: {}", config.max_workers());
    println!("  Timeout: {}s", config.timeout_secs());
    println!("  Simulated Latency: {}ms", config.simulated_latency_ms());

    match config.task_file() {
        Some(file) => println!("  Tasks: {}", file),
        None => println!("  Tasks: {} sample tasks", config.sample_count()),
    }

    if let Some(path) = config.output_path() {
        let formats: Vec<String> = config
            .output_formats()
            .iter()
            .map(|f| format!("{:?}", f).to_lowercase())
            .collect();
        println!("  Output: {} ({})", path, formats.join(", "));
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig, task_count: usize) {
    println!("🔍 Dry Run Analysis:");
    println!("  Tasks to execute: {}", task_count);

    let workers = config.max_workers().max(1);
    let waves = task_count.div_ceil(workers);
    let latency_secs = config.simulated_latency_ms() as f64 / 1000.0;
    println!(
        "  Worker waves: {} (≈{:.2}s with simulated latency)",
        waves,
        waves as f64 * latency_secs
    );

    if latency_secs > config.timeout_secs() {
        println!("  ⚠️ Simulated latency exceeds the task timeout; every task will time out");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
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
    std::process::exit(e.exit_code().max(1));
}
