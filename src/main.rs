use clap::Parser;
use pulse_dash::cli::{Cli, Commands};
use pulse_dash::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::from_toml(include_str!("../config.toml.example"))
    })?;

    // Initialize telemetry
    pulse_dash::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting dashboard");
            args.execute(&config).await?;
        }
        Commands::Price(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed REST: {}", config.feed.rest_url);
            println!("  Feed WS:   {}", config.feed.ws_url);
            println!(
                "  Retries:   {} every {}ms",
                config.feed.max_retries, config.feed.reconnect_delay_ms
            );
            for (name, metric) in [("coffee", &config.metrics.coffee), ("sms", &config.metrics.sms)] {
                println!(
                    "  Metric {}: start={} step=[{}, {}) every {}ms",
                    name,
                    metric.initial_value,
                    metric.min_increase,
                    metric.max_increase,
                    metric.update_interval_ms
                );
            }
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
