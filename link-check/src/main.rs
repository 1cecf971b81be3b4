use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use link_check::config::Config;
use link_check::ignore::IgnoreList;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?.with_root_arg(std::env::args().nth(1));
    info!("Scanning {}", config.root.display());

    let report = link_check::run(&config, &IgnoreList::default()).await?;
    print!("{}", report);

    Ok(ExitCode::from(report.exit_code()))
}
