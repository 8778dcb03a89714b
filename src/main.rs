use clap::Parser;
use csv_splitter::core::ConfigProvider;
use csv_splitter::utils::{logger, validation::Validate};
use csv_splitter::{CliConfig, FileSplitPipeline, LocalStorage, SplitEngine, SplitPlan};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("🚀 Starting csv-splitter");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Some(plan_path) = &config.plan {
        tracing::info!("📁 Loading split plan from: {}", plan_path);

        // 載入 TOML 分組計畫
        let plan = match SplitPlan::from_file(plan_path) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("❌ Failed to load plan file '{}': {}", plan_path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        };

        run_split(plan, config.dry_run).await
    } else {
        let dry_run = config.dry_run;
        run_split(config, dry_run).await
    }
}

async fn run_split<C: ConfigProvider + Validate>(
    config: C,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 顯示分組摘要
    display_split_summary(&config, dry_run);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        return Ok(());
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = FileSplitPipeline::new(storage, config);

    // 創建分組引擎並運行
    let engine = SplitEngine::new(pipeline);

    match engine.run().await {
        Ok(written) => {
            tracing::info!("✅ Split process completed successfully!");
            println!("✅ Split process completed successfully!");
            for path in written {
                println!("📁 {}", path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Split process failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                csv_splitter::utils::error::ErrorSeverity::Low => 0,
                csv_splitter::utils::error::ErrorSeverity::Medium => 2,
                csv_splitter::utils::error::ErrorSeverity::High => 1,
                csv_splitter::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_split_summary<C: ConfigProvider>(config: &C, dry_run: bool) {
    println!("📋 Split Plan Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());

    if let Some(archive) = config.archive_name() {
        println!("  Archive: {}", archive);
    }

    println!(
        "  Report: {}",
        if config.write_report() {
            "enabled"
        } else {
            "disabled"
        }
    );

    println!("  Splits:");
    for spec in config.splits() {
        match spec.explicit_quota() {
            Some(quota) => println!("    {} -> {} rows", spec.group_key(), quota),
            None => println!("    {} -> share of leftover rows", spec.group_key()),
        }
    }

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
