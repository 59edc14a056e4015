mod config;
mod propagation;
mod report;
mod sim;

use std::fs::{self, File};
use std::io::{self, Write};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::config::SimulationConfig;
use crate::propagation::Satellite;
use crate::sim::DerivationMode;

#[derive(Parser)]
#[command(name = "satimu")]
#[command(about = "Synthesize IMU/GPS sensor streams from two-line element sets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate sensor streams for a TLE file
    Simulate {
        /// Path to a TLE file (two lines, or three with a name line)
        tle: String,
        /// YAML configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<String>,
        /// Override the configured random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the configured start time (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Override the configured derivation mode
        #[arg(long, value_enum)]
        mode: Option<DerivationMode>,
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Validate a configuration file
    Validate { config: String },
    /// Print the satellite identity parsed from a TLE file
    Info { tle: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            tle,
            config,
            seed,
            start,
            mode,
            format,
            output,
        } => simulate(
            &tle,
            config.as_deref(),
            seed,
            start,
            mode,
            format,
            output.as_deref(),
        ),
        Commands::Validate { config } => validate(&config),
        Commands::Info { tle } => info(&tle),
    }
}

fn simulate(
    tle_path: &str,
    config_path: Option<&str>,
    seed: Option<u64>,
    start: Option<DateTime<Utc>>,
    mode: Option<DerivationMode>,
    format: Format,
    output: Option<&str>,
) -> ExitCode {
    let satellite = match load_satellite(tle_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut config = match config_path {
        Some(path) => {
            let yaml = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error reading file: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match SimulationConfig::from_yaml_str(&yaml) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Invalid configuration: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    if let Some(start) = start {
        config.start = Some(start);
    }
    if let Some(mode) = mode {
        config.mode = mode;
    }

    // The clock and entropy are consulted only here; the run itself is a pure
    // function of its inputs.
    let start = config.start.unwrap_or_else(Utc::now);
    let mut rng = match config.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_entropy(),
    };

    let run = match sim::simulate(&satellite, start, &config, &mut rng) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let writer: Box<dyn Write> = match output {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("Error creating {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    let written = match format {
        Format::Json => report::write_json(writer, &satellite, &config, start, &run),
        Format::Csv => report::write_csv(writer, &run.streams),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn validate(path: &str) -> ExitCode {
    let yaml = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match SimulationConfig::from_yaml_str(&yaml) {
        Ok(config) => {
            println!(
                "Configuration is valid ({} mode, dt {}, duration {})",
                config.mode,
                humantime::format_duration(config.dt),
                humantime::format_duration(config.duration)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn info(path: &str) -> ExitCode {
    let satellite = match load_satellite(path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    println!("{} (NORAD {})", satellite.label(), satellite.norad_id);
    println!("Epoch: {}", satellite.elements.datetime);
    ExitCode::SUCCESS
}

fn load_satellite(path: &str) -> Result<Satellite, ExitCode> {
    let tle = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    match Satellite::from_tle(&tle) {
        Ok(s) => Ok(s),
        Err(e) => {
            eprintln!("Invalid TLE: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}
