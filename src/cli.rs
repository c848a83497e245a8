use crate::config::{DEFAULT_STABILITY_CLAMP, SolverConfig, SurfaceForcing};
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use std::path::PathBuf;

/// Periodic steady-state temperature of a soil column under seasonal surface forcing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Column depth in meters
    #[arg(long, default_value_t = 100.0)]
    depth: f64,

    /// Number of depth steps
    #[arg(long, default_value_t = 400)]
    depth_steps: usize,

    /// Number of time steps per year
    #[arg(long, default_value_t = 5000)]
    time_steps: usize,

    /// Thermal diffusivity (m²/s)
    #[arg(long, default_value_t = 1e-6)]
    diffusivity: f64,

    /// Stability number driving the update in place of K*dt/dz²
    #[arg(long, default_value_t = DEFAULT_STABILITY_CLAMP)]
    stability_clamp: f64,

    /// Use the physically derived stability number
    #[arg(long)]
    no_clamp: bool,

    /// Mean surface temperature (°C)
    #[arg(long, default_value_t = 15.0)]
    mean_temperature: f64,

    /// Seasonal surface amplitude (°C)
    #[arg(long, default_value_t = 10.0)]
    amplitude: f64,

    /// Uniform initial temperature (°C)
    #[arg(long, default_value_t = 15.0)]
    initial_temperature: f64,

    /// Year-over-year change at which the cycle counts as periodic
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    /// Years to simulate before giving up
    #[arg(long, default_value_t = 500)]
    max_years: usize,

    /// Sweep the depth axis in parallel
    #[arg(long)]
    parallel: bool,

    /// Worker threads for the parallel sweep (defaults to the CPU count)
    #[arg(long)]
    threads: Option<usize>,

    /// Directory for field.csv, trace.csv and envelope.csv
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep every n-th time sample in field.csv
    #[arg(long, default_value_t = 1)]
    output_every: usize,

    /// Calendar date of t = 0 for exported timestamps
    #[arg(long, default_value = "2000-01-01")]
    reference_date: NaiveDate,
}

// Settings that shape the run but not the numerics
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub threads: usize,
    pub output_dir: Option<PathBuf>,
    pub output_every: usize,
    pub reference_time: NaiveDateTime,
}

pub fn get_args() -> Result<(SolverConfig, RunOptions)> {
    into_config(Args::parse())
}

fn into_config(args: Args) -> Result<(SolverConfig, RunOptions)> {
    if args.output_every == 0 {
        bail!("--output-every must be at least 1");
    }
    let threads = args.threads.unwrap_or_else(num_cpus::get);
    if threads == 0 {
        bail!("--threads must be at least 1");
    }

    let config = SolverConfig {
        depth: args.depth,
        depth_steps: args.depth_steps,
        time_steps: args.time_steps,
        diffusivity: args.diffusivity,
        stability_clamp: if args.no_clamp {
            None
        } else {
            Some(args.stability_clamp)
        },
        initial_temperature: args.initial_temperature,
        surface: SurfaceForcing::new(args.mean_temperature, args.amplitude),
        tolerance: args.tolerance,
        max_years: args.max_years,
        parallel: args.parallel,
        ..SolverConfig::default()
    };

    let reference_time = args
        .reference_date
        .and_hms_opt(0, 0, 0)
        .context("Failed to build reference time")?;

    let options = RunOptions {
        threads,
        output_dir: args.output_dir,
        output_every: args.output_every,
        reference_time,
    };

    Ok((config, options))
}
