#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the EV infrastructure county pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ev_map_analytics::overview::{ev_category_counts, gap_ranking, overview};
use ev_map_analytics_models::CountySummary;
use ev_map_entity_models::{StationRecord, VehicleRecord};
use ev_map_geography::CityCountyMap;
use ev_map_pipeline::{export, run_pipeline};
use ev_map_source::config::load_config;
use ev_map_source_models::{SourceConfig, SourcePaths};

/// Config file used when neither `--config` nor `EV_MAP_CONFIG` is set.
const DEFAULT_CONFIG: &str = "ev_map.toml";

#[derive(Parser)]
#[command(
    name = "ev_map",
    about = "Connecticut EV registration and charging infrastructure pipeline"
)]
struct Cli {
    /// Path to the source config TOML (overrides `EV_MAP_CONFIG` env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Income-by-county CSV (overrides the config file)
    #[arg(long, global = true)]
    income: Option<PathBuf>,
    /// Vehicle registration CSV (overrides the config file)
    #[arg(long, global = true)]
    vehicles: Option<PathBuf>,
    /// Charging station CSV (overrides the config file)
    #[arg(long, global = true)]
    stations: Option<PathBuf>,
    /// Header-less population CSV (overrides the config file)
    #[arg(long, global = true)]
    population: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the vehicle, station, and county tables
    Run {
        /// Directory to write the CSV files into
        #[arg(long, default_value = "data/output")]
        output_dir: PathBuf,
    },
    /// Print the county summary table
    Summary {
        /// Print JSON instead of an aligned table
        #[arg(long)]
        json: bool,
    },
    /// Print the cities that did not resolve to a county
    Unmapped {
        /// Print JSON instead of a list
        #[arg(long)]
        json: bool,
        /// Maximum number of cities to list
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Resolve a city name to its county
    Resolve {
        /// City name, in any case
        city: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Resolve { city } => {
            match CityCountyMap::global().resolve(city) {
                Some(county) => println!("{county}"),
                None => println!("unmapped"),
            }
        }
        Commands::Run { output_dir } => {
            let output = run_pipeline(&source_config(&cli)?)?;
            let paths = export::write_outputs(output_dir, &output)?;
            for path in paths {
                println!("{}", path.display());
            }
        }
        Commands::Summary { json } => {
            let output = run_pipeline(&source_config(&cli)?)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&output.summaries)?);
            } else {
                let vehicles: Vec<&VehicleRecord> = output.vehicles.iter().collect();
                let stations: Vec<&StationRecord> = output.stations.iter().collect();
                let overview = overview(&vehicles, &stations, &output.summaries);

                println!(
                    "{} EV records, {} stations, {} chargers across {} counties \
                     ({} EVs per charger)",
                    overview.ev_records,
                    overview.charging_stations,
                    overview.total_chargers,
                    overview.counties_in_view,
                    format_ratio(overview.evs_per_charger)
                );
                for count in ev_category_counts(&output.vehicles) {
                    println!("  {:<8} {}", count.category.as_ref(), count.count);
                }
                println!();
                print_summary_table(&output.summaries);

                let ranked = gap_ranking(&output.summaries);
                if let Some(widest) = ranked.first() {
                    println!();
                    println!(
                        "Widest charging gap: {} ({} EVs per charger)",
                        widest.county,
                        format_ratio(widest.evs_per_charger)
                    );
                }
            }
        }
        Commands::Unmapped { json, limit } => {
            let output = run_pipeline(&source_config(&cli)?)?;
            let report = output.report;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} vehicles and {} stations have no county",
                    report.unmapped_vehicles, report.unmapped_stations
                );
                for city in report.unmapped_cities.iter().take(*limit) {
                    println!(
                        "  {:<30} {:>7} vehicles {:>5} stations",
                        city.city, city.vehicles, city.stations
                    );
                }
            }
        }
    }

    Ok(())
}

/// Builds the source config from `--config`, `EV_MAP_CONFIG`, or the
/// default file, then applies any per-source path flags.
///
/// Without a config file, all four path flags must be given.
fn source_config(cli: &Cli) -> Result<SourceConfig, Box<dyn std::error::Error>> {
    let explicit = cli
        .config
        .clone()
        .or_else(|| std::env::var("EV_MAP_CONFIG").ok().map(PathBuf::from));
    let config_path = explicit.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let mut config = if explicit.is_some() || config_path.exists() {
        load_config(&config_path)?
    } else if let (Some(income), Some(vehicles), Some(stations), Some(population)) =
        (&cli.income, &cli.vehicles, &cli.stations, &cli.population)
    {
        log::info!("No config file; using source paths from the command line");
        SourceConfig::from_paths(SourcePaths {
            income: income.clone(),
            vehicles: vehicles.clone(),
            stations: stations.clone(),
            population: population.clone(),
        })
    } else {
        return Err(format!(
            "no config file found at {}; pass --config or all of \
             --income, --vehicles, --stations, --population",
            config_path.display()
        )
        .into());
    };

    let overrides = [
        (&cli.income, &mut config.paths.income),
        (&cli.vehicles, &mut config.paths.vehicles),
        (&cli.stations, &mut config.paths.stations),
        (&cli.population, &mut config.paths.population),
    ];
    for (flag, path) in overrides {
        if let Some(flag) = flag {
            path.clone_from(flag);
        }
    }

    Ok(config)
}

fn print_summary_table(summaries: &[CountySummary]) {
    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>6} {:>6} {:>6} {:>10} {:>10} {:>8} {:>8} {:>8}",
        "county",
        "evs",
        "stations",
        "chargers",
        "dcfc",
        "l2",
        "l1",
        "income",
        "population",
        "ev/chg",
        "ev/1k",
        "chg/1k"
    );
    for s in summaries {
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>6} {:>6} {:>6} {:>10} {:>10} {:>8} {:>8} {:>8}",
            s.county,
            s.ev_registrations,
            s.total_stations,
            s.total_chargers,
            s.fast_chargers,
            s.level2_chargers,
            s.level1_chargers,
            s.median_income.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
            s.population.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
            format_ratio(s.evs_per_charger),
            format_ratio(s.evs_per_1k_people),
            format_ratio(s.chargers_per_1k_people),
        );
    }
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
