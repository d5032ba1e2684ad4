use clap::Parser;
use cross_scanner::cli::{Cli, Commands};
use cross_scanner::config::Config;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        eprintln!("Warning: {} not found, using bundled defaults", cli.config);
        Config::parse(include_str!("../config.toml.example"))?
    };

    // Initialize telemetry
    let _telemetry = cross_scanner::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting scan loop");
            args.execute(config).await?;
        }
        Commands::Universe(args) => {
            args.execute(&config).await?;
        }
        Commands::Check(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
            println!(
                "# notify.bot_token: {}",
                if config.notify.bot_token.is_empty() { "not set" } else { "set" }
            );
        }
    }

    Ok(())
}
