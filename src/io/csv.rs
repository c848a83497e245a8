use crate::convergence::{ConvergenceTrace, SolverOutcome};
use crate::grid::Grid;
use crate::io::results::{EnvelopeRow, depth_envelope};
use crate::state::TemperatureField;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

// One (time, depth) cell of the converged field
#[derive(Debug, Serialize)]
struct FieldRecord {
    time_s: f64,
    timestamp: String,
    depth_m: f64,
    temperature_c: f64,
}

pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))
}

fn timestamp(reference_time: &NaiveDateTime, time_s: f64) -> Result<String> {
    let offset = Duration::try_milliseconds((time_s * 1000.0).round() as i64)
        .with_context(|| format!("Time offset out of range: {} s", time_s))?;
    let stamp = reference_time
        .checked_add_signed(offset)
        .with_context(|| format!("Timestamp overflow at {} s", time_s))?;
    Ok(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Long-format field dump, keeping every `every`-th time sample.
pub fn write_field(
    path: &Path,
    grid: &Grid,
    field: &TemperatureField,
    reference_time: &NaiveDateTime,
    every: usize,
) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;

    for t in (0..field.time_samples()).step_by(every.max(1)) {
        let time_s = grid.times[t];
        let stamp = timestamp(reference_time, time_s)?;
        for (z, &temperature_c) in field.row(t).iter().enumerate() {
            wtr.serialize(FieldRecord {
                time_s,
                timestamp: stamp.clone(),
                depth_m: grid.depths[z],
                temperature_c,
            })?;
        }
    }

    wtr.flush().context("Failed to flush field CSV")?;
    Ok(())
}

pub fn write_trace(path: &Path, trace: &ConvergenceTrace) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for entry in trace.entries() {
        wtr.serialize(entry)?;
    }
    wtr.flush().context("Failed to flush trace CSV")?;
    Ok(())
}

pub fn write_envelope(path: &Path, rows: &[EnvelopeRow]) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().context("Failed to flush envelope CSV")?;
    Ok(())
}

// Write field.csv, trace.csv and envelope.csv into `dir`
pub fn export_results(
    dir: &Path,
    outcome: &SolverOutcome,
    reference_time: &NaiveDateTime,
    every: usize,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let field_path = dir.join("field.csv");
    let trace_path = dir.join("trace.csv");
    let envelope_path = dir.join("envelope.csv");

    write_field(
        &field_path,
        &outcome.grid,
        &outcome.field,
        reference_time,
        every,
    )?;
    write_trace(&trace_path, &outcome.trace)?;
    write_envelope(
        &envelope_path,
        &depth_envelope(&outcome.grid, &outcome.field),
    )?;

    Ok(vec![field_path, trace_path, envelope_path])
}
