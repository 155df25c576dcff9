use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use davshare::{Config, ShareRegistry};

#[derive(Debug, clap::Parser)]
#[command(about, version)]
struct Cli {
    /// path to the JSON configuration file
    #[arg(short, long, default_value = "/etc/davshare/config.json")]
    config: PathBuf,
    /// override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let port = cli.port.unwrap_or(config.port);
    let registry = ShareRegistry::new(config.shares)?;

    davshare::server::serve(registry, port).await
}
