mod pattern;

use clap::Parser;
use heatfield_core::{Material, SimConfig, Simulation, SimulationMode};
use pattern::{generate_sources, sample_pattern_type};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Grid size N (NxN), clamped to [20, 200]
    #[arg(long, default_value_t = 50)]
    n: usize,

    /// Simulation mode (diffusion|eikonal|combined)
    #[arg(long, default_value = "diffusion")]
    mode: SimulationMode,

    /// Number of steps to run
    #[arg(long, default_value_t = 500)]
    steps: u64,

    /// Time step, clamped to [0.001, 0.1]
    #[arg(long, default_value_t = 0.01)]
    time_step: f64,

    /// Extra heat source as "x,y,temperature" (repeatable)
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Number of heat sources placed by a random pattern
    #[arg(long, default_value_t = 0)]
    random_sources: usize,

    /// RNG seed for random placement
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Write a snapshot every K steps (the final state is always written)
    #[arg(long, default_value_t = 100)]
    snapshot_every: u64,
}

#[derive(Serialize)]
struct MetaRow {
    snapshot_idx: u64,
    iteration: u64,
    elapsed_time: f64,

    n: usize,
    mode: String,
    time_step: f64,
    diffusion_number: f64,

    max_temperature: f64,
    molten_cells: usize,
    source_count: usize,

    pattern: Option<String>,
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.snapshot_every == 0 {
        return Err("snapshot_every must be > 0".into());
    }

    let explicit = parse_sources(&args.sources)?;

    fs::create_dir_all(&args.out)?;

    let mut temperature_writer = BufWriter::new(File::create(args.out.join("temperature.bin"))?);
    let mut eikonal_writer = BufWriter::new(File::create(args.out.join("eikonal.bin"))?);

    let mut meta_file = BufWriter::new(
        OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(args.out.join("meta.jsonl"))?,
    );

    let config = SimConfig::default()
        .with_grid_size(args.n)
        .with_time_step(args.time_step);
    let mut sim = Simulation::new(config, Material::IRON);
    let n = sim.grid_size();
    if n != args.n {
        warn!(requested = args.n, used = n, "grid size clamped");
    }

    for (x, y, t) in explicit {
        if !sim.add_heat_source(x, y, t) {
            warn!(x, y, "source outside the grid, skipped");
        }
    }

    let pattern = if args.random_sources > 0 {
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
        let p = sample_pattern_type(&mut rng);
        for (x, y, t) in generate_sources(&mut rng, n, args.random_sources, p) {
            sim.add_heat_source(x, y, t);
        }
        info!(pattern = p.as_str(), count = args.random_sources, "random sources placed");
        Some(p)
    } else {
        None
    };

    sim.set_mode(args.mode);
    sim.set_running(true);

    let mut snapshot_idx: u64 = 0;
    let mut unstable_steps: u64 = 0;

    for step in 1..=args.steps {
        if let Some(report) = sim.step() {
            if report.stability_warning() {
                unstable_steps += 1;
            }
        }

        if step % args.snapshot_every != 0 && step != args.steps {
            continue;
        }

        write_f64_vec(&mut temperature_writer, sim.temperature_field())?;
        write_f64_vec(&mut eikonal_writer, sim.eikonal_field())?;

        let stats = sim.stats();
        let row = MetaRow {
            snapshot_idx,
            iteration: stats.iterations,
            elapsed_time: stats.elapsed_time,

            n,
            mode: sim.mode().to_string(),
            time_step: sim.time_step(),
            diffusion_number: sim.diffusion_number(),

            max_temperature: stats.max_temperature,
            molten_cells: stats.molten_cells,
            source_count: stats.source_count,

            pattern: pattern.map(|p| p.as_str().to_string()),
            seed: args.seed,
        };

        serde_json::to_writer(&mut meta_file, &row)?;
        meta_file.write_all(b"\n")?;

        snapshot_idx += 1;
    }

    temperature_writer.flush()?;
    eikonal_writer.flush()?;
    meta_file.flush()?;

    let stats = sim.stats();
    println!("Wrote snapshots to: {}", args.out.display());
    println!(
        "Snapshots: {} (steps={}, n={}, mode={}), max temp {:.2}, unstable steps {}",
        snapshot_idx,
        stats.iterations,
        n,
        sim.mode(),
        stats.max_temperature,
        unstable_steps
    );

    Ok(())
}

fn write_f64_vec<W: Write>(w: &mut W, v: &[f64]) -> std::io::Result<()> {
    for &x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}

/// Parse `"x,y,temperature"` specs.
fn parse_sources(
    specs: &[String],
) -> Result<Vec<(usize, usize, f64)>, Box<dyn std::error::Error>> {
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
        let [x, y, t] = parts.as_slice() else {
            return Err(format!("source {spec:?} must look like x,y,temperature").into());
        };
        let temperature: f64 = t.parse()?;
        if !temperature.is_finite() {
            return Err(format!("source {spec:?} has a non-finite temperature").into());
        }
        out.push((x.parse()?, y.parse()?, temperature));
    }
    Ok(out)
}
