use clap::Parser;
use tier1_mirrors::core::{ConfigProvider, Storage};
use tier1_mirrors::utils::error::{EtlError, ErrorSeverity};
use tier1_mirrors::utils::{logger, validation::Validate};
use tier1_mirrors::{CliConfig, EtlEngine, LocalStorage, StdoutStorage, Tier1Pipeline, TomlConfig};

#[tokio::main]
async fn main() {
    let args = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting tier1-mirrors");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        return;
    }

    let result = match config.output_path() {
        Some(_) => run(LocalStorage::new(".".to_string()), config).await,
        None => run(StdoutStorage, config).await,
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Tier 1 index written to: {}", output_path);
        }
        Err(e) => exit_with(&e),
    }
}

async fn run<S: Storage>(storage: S, config: TomlConfig) -> tier1_mirrors::Result<String> {
    let pipeline = Tier1Pipeline::new(storage, config)?;
    EtlEngine::new(pipeline).run().await
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration:");
    tracing::info!("   Tier 1 page: {}{}", config.base_url(), config.tier1_path());
    tracing::info!("   Status feed: {}{}", config.base_url(), config.status_path());
    tracing::info!("   Timeout: {:?}", config.timeout());
    tracing::info!("   Match mode: {:?}", config.match_mode());
    tracing::info!("   Output: {}", config.output_path().unwrap_or("<stdout>"));
}

fn exit_with(e: &EtlError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Tier 1 collection failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
