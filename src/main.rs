use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use weatherdash::{WeatherDashConfig, WeatherService, init_tracing, web};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on, overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch and record the current weather for a city
    Fetch {
        #[arg(long)]
        city: String,
    },
    /// Show stored readings for a city, newest first
    History {
        #[arg(long)]
        city: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show the newest stored reading for a city without calling the API
    Latest {
        #[arg(long)]
        city: String,
    },
    /// Temperature insight from a city's stored readings
    Insight {
        #[arg(long)]
        city: String,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = WeatherDashConfig::load_from_path(cli.config)?;
    init_tracing(&config.logging, cli.verbose);

    if let Commands::Config = cli.command {
        let mut shown = config.clone();
        if shown.openweather.api_key.is_some() {
            shown.openweather.api_key = Some("***".to_string());
        }
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let service = WeatherService::from_config(config)?;

    match cli.command {
        Commands::Serve { port } => {
            service.prune_history().await?;
            let port = port.unwrap_or(service.config().server.port);
            web::run(Arc::new(service), port).await?;
        }
        Commands::Fetch { city } => {
            let weather = service.fetch_and_record(&city).await?;
            println!(
                "{}, {}: {} (feels like {:.1}°C), {}, humidity {}%, wind {:.1} m/s",
                weather.city,
                weather.country,
                weather.format_temperature(),
                weather.feels_like,
                weather.condition,
                weather.humidity,
                weather.wind_speed
            );
        }
        Commands::History { city, limit } => {
            let readings = service.city_history(&city, limit).await?;
            if readings.is_empty() {
                println!("No readings stored for '{}'", city);
            }
            for reading in readings {
                println!("{reading}");
            }
        }
        Commands::Latest { city } => match service.latest_reading(&city).await? {
            Some(reading) => println!("{reading}"),
            None => println!("No readings stored for '{}'", city),
        },
        Commands::Insight { city } => {
            let insight = service.temperature_insight(&city).await?;
            println!("{}", serde_json::to_string_pretty(&insight)?);
        }
        Commands::Config => {}
    }

    Ok(())
}
