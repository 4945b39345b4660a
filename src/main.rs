use std::path::Path;

use clap::Parser;
use cruise_widget::config::LogFormat;
use cruise_widget::utils::{logger, validation::Validate};
use cruise_widget::{server, AppConfig, AppState, CliArgs};

fn load_config(args: &CliArgs) -> cruise_widget::Result<AppConfig> {
    let mut config = if Path::new(&args.config).exists() {
        AppConfig::from_file(&args.config)?
    } else {
        AppConfig::from_env()?
    };
    args.apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Provide '{}' or set AI_ENDPOINT / WIDGET_SECRET", args.config);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    match config.logging.format {
        LogFormat::Json => logger::init_json_logger(config.logging.verbose),
        LogFormat::Compact => logger::init_cli_logger(config.logging.verbose),
    }

    tracing::info!("🚀 Starting cruise-widget gateway");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let state = AppState::from_config(&config)?;
    server::serve(&config, state).await?;

    Ok(())
}
