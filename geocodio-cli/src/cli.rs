use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use geocodio_core::{Config, Coordinates, Geocodio};
use inquire::Password;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geocodio", version, about = "Geocodio geocoding CLI")]
pub struct Cli {
    /// Print the raw JSON response instead of a summary.
    #[arg(long, global = true)]
    pub raw: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key in the config file.
    Configure,

    /// Look up coordinates for an address.
    Geocode {
        address: String,

        /// Extra fields to request, e.g. "timezone,cd".
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Look up addresses near a point.
    #[command(allow_negative_numbers = true)]
    Reverse {
        latitude: f64,
        longitude: f64,

        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Geocode several addresses in one request.
    BatchGeocode {
        #[arg(required = true)]
        addresses: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Reverse geocode several "lat,lng" points in one request.
    BatchReverse {
        #[arg(required = true, allow_hyphen_values = true, value_parser = parse_coordinates)]
        points: Vec<Coordinates>,

        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Geocode { address, fields } => {
                let result = client()?.geocode_return_fields(&address, &fields).await?;
                output::print_result(&result, self.raw);
            }
            Command::Reverse { latitude, longitude, fields } => {
                let result =
                    client()?.reverse_return_fields(latitude, longitude, &fields).await?;
                output::print_result(&result, self.raw);
            }
            Command::BatchGeocode { addresses, fields } => {
                let batch = client()?.batch_geocode_return_fields(&addresses, &fields).await?;
                output::print_batch(&batch, self.raw);
            }
            Command::BatchReverse { points, fields } => {
                let batch = client()?.batch_reverse_return_fields(&points, &fields).await?;
                output::print_batch(&batch, self.raw);
            }
        }

        Ok(())
    }
}

fn client() -> Result<Geocodio> {
    let config = Config::load()?;
    Ok(Geocodio::from_config(&config)?)
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Geocodio API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.set_api_key(api_key);
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn parse_coordinates(value: &str) -> Result<Coordinates, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got {value:?}"))?;

    let latitude = lat.trim().parse::<f64>().map_err(|e| format!("invalid latitude: {e}"))?;
    let longitude = lng.trim().parse::<f64>().map_err(|e| format!("invalid longitude: {e}"))?;

    Ok(Coordinates::new(latitude, longitude))
}
