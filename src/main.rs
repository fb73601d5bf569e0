use bulk_site_import::utils::error::ErrorSeverity;
use bulk_site_import::utils::{logger, validation::Validate};
use bulk_site_import::{
    CliConfig, ImportEngine, ImportError, InMemoryPlatform, LocalStorage, TomlConfig,
    TracingAuditListener,
};
use clap::Parser;
use std::sync::Arc;

fn main() {
    let cli = CliConfig::parse();

    // 載入 TOML 配置（未指定時使用預設值）
    let config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    if cli.json_logs || config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("Starting bulk-site-import");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli, config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: &CliConfig, mut config: TomlConfig) -> Result<i32, ImportError> {
    // 套用命令列覆蓋設定
    if let Some(max_rows) = cli.max_rows {
        config.import.max_rows = max_rows;
        tracing::info!("🔧 Row limit overridden to: {}", max_rows);
    }

    config.validate()?;

    let storage = LocalStorage::new(".".to_string());
    let snapshot_path = cli
        .platform
        .clone()
        .or_else(|| config.snapshot_path().map(str::to_string));

    let snapshot = config.load_snapshot(&storage, snapshot_path.as_deref())?;

    let platform = Arc::new(InMemoryPlatform::new(snapshot));
    let importer = platform
        .importer_builder(&config)
        .with_listener(Arc::new(TracingAuditListener))
        .build();
    tracing::info!("Capabilities: {:?}", importer.capabilities());

    let engine = ImportEngine::new(importer, storage.clone());
    let format = cli.format.unwrap_or_else(|| config.report_format());

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - rows are validated but nothing is created");
        let text = engine.extract(&cli.input)?;
        let mut invalid = 0;
        for (line, parsed) in engine.importer().preview(&text) {
            match parsed {
                Ok(row) => println!("line {:>3}: ok    {} / {} ({})", line, row.domain, row.username, row.title()),
                Err(error) => {
                    invalid += 1;
                    println!("line {:>3}: error {}", line, error);
                }
            }
        }
        return Ok(if invalid == 0 { 0 } else { 2 });
    }

    let output = cli
        .output
        .clone()
        .or_else(|| config.report_output().map(str::to_string))
        .unwrap_or_else(|| "-".to_string());
    let report = engine.run(&cli.input, format, Some(output.as_str()))?;

    if cli.write_back {
        let path = snapshot_path.ok_or_else(|| ImportError::MissingConfigError {
            field: "platform.snapshot".to_string(),
        })?;
        platform.snapshot()?.save(&storage, &path)?;
        tracing::info!("📁 Platform snapshot saved to: {}", path);
    }

    if report.num_failed > 0 {
        tracing::warn!("⚠️ {} row(s) failed", report.num_failed);
        Ok(2)
    } else {
        tracing::info!("✅ Import completed successfully!");
        Ok(0)
    }
}
