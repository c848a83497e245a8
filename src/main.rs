use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

mod analytical;
mod boundary;
mod cli;
mod config;
mod convergence;
mod error;
mod ftcs_kernel;
mod grid;
mod io;
mod state;

use analytical::PeriodicHalfSpace;
use cli::get_args;
use convergence::solve_with_observer;
use io::csv::export_results;
use io::results::depth_envelope;

fn main() -> Result<()> {
    // Configuration
    let (config, options) = get_args()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build_global()
        .context("Failed to configure worker threads")?;

    let reference = PeriodicHalfSpace::for_solver(&config);

    println!("Simulation Configuration:");
    println!(
        "  Column: {} m, {} depth steps (dz = {} m)",
        config.depth,
        config.depth_steps,
        config.dz()
    );
    println!(
        "  Year: {} time steps (dt = {} s)",
        config.time_steps,
        config.dt()
    );
    println!("  Diffusivity: {:e} m2/s", config.diffusivity);
    println!(
        "  Surface: {} - {} * sin(2*pi*t/S) C",
        config.surface.mean, config.surface.amplitude
    );
    println!(
        "  Damping depth: {:.3} m (phase lag {:.1} days)",
        reference.damping_depth(),
        reference.lag_at(reference.damping_depth()) / 86_400.0
    );
    println!(
        "  Tolerance: {:e}, max years: {}",
        config.tolerance, config.max_years
    );
    if config.parallel {
        println!("  Parallel sweep on {} threads", options.threads);
    }

    let pb = ProgressBar::new(config.max_years as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} years {msg}")?
            .progress_chars("#>-"),
    );

    // Run the annual convergence loop
    println!("\nSearching for the periodic steady state...");
    let started = Instant::now();
    let result = solve_with_observer(&config, |entry| {
        pb.inc(1);
        pb.set_message(format!("error {:.3e}", entry.error));
    });

    let outcome = match result {
        Ok(outcome) => {
            pb.finish_and_clear();
            outcome
        }
        Err(e) => {
            pb.abandon();
            eprintln!("FATAL: {}", e);
            return Err(e).context("No periodic steady state reached; nothing written");
        }
    };

    println!(
        "Converged after {} years in {:.2?} (final error {:.3e})",
        outcome.years(),
        started.elapsed(),
        outcome.final_error()
    );

    let stability = outcome.stability;
    if stability.is_clamped() {
        println!(
            "  Stability number: {} (physical K*dt/dz2 = {:.6}, clamped)",
            stability.effective, stability.physical
        );
        println!(
            "  Effective diffusivity: {:e} m2/s",
            config.effective_diffusivity()
        );
    } else {
        println!("  Stability number: {:.6}", stability.effective);
    }

    let envelope = depth_envelope(&outcome.grid, &outcome.field);
    if let Some(deepest) = envelope.last() {
        println!(
            "  Annual swing: {:.3} C at surface, {:.3e} C at {} m (half-space: {:.3e} C)",
            envelope[0].swing(),
            deepest.swing(),
            deepest.depth_m,
            2.0 * reference.amplitude_at(deepest.depth_m)
        );
    }

    if let Some(dir) = &options.output_dir {
        let written = export_results(
            dir,
            &outcome,
            &options.reference_time,
            options.output_every,
        )?;
        for path in written {
            println!("Results saved to {}", path.display());
        }
    }

    Ok(())
}
