use crate::config::toml_config::{AppConfig, LogFormat};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "cruise-widget")]
#[command(about = "Chat widget gateway with domain-bound widget tokens")]
pub struct CliArgs {
    /// Path to TOML configuration file (falls back to environment variables when absent)
    #[arg(short, long, env = "WIDGET_CONFIG", default_value = "widget.toml")]
    pub config: String,

    /// Override the listening port
    #[arg(long)]
    pub port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Allow the built-in development signing secret when none is configured
    #[arg(long)]
    pub insecure_dev_secret: bool,
}

impl CliArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.insecure_dev_secret {
            config.widget.insecure_dev_secret = true;
        }
    }
}
