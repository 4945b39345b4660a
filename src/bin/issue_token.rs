use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use cruise_widget::adapters::clock::SystemClock;
use cruise_widget::utils::logger;
use cruise_widget::{AllowList, AppConfig, DomainGate, TokenAuthority};

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Mint a widget token for an allow-listed domain")]
struct Args {
    /// Domain the token is bound to (must be in the allow list)
    domain: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "widget.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = if Path::new(&args.config).exists() {
        AppConfig::from_file(&args.config)?
    } else {
        AppConfig::from_env()?
    };

    let authority = TokenAuthority::new(config.signing_secret()?, Arc::new(SystemClock));
    let gate = DomainGate::new(
        authority,
        AllowList::new(config.widget.allowed_domains.iter().cloned()),
    );

    let issued = gate.issue(Some(&args.domain))?;
    println!("{}", issued.token);
    eprintln!("⏰ Expires at {}", issued.claims.expires_at());

    Ok(())
}
