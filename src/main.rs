use clap::Parser;
use log::{info, LevelFilter};
use oildrift::config::{InitMode, RunConfig};
use oildrift::mesh::{reader, Mesh};
use oildrift::restart;
use oildrift::simulation::Simulation;
use oildrift::sink::{FrameWriter, RestartWriter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::time::Instant;

/**
 * Simulate the transport of spilled oil over a triangulated bay and report
 * how much of it reaches the fishing grounds.
 */
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Path to the TOML run configuration
    config: PathBuf,

    /// Log every integration step instead of only the snapshots
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new()
        .with_level(if opts.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()?;

    let config = RunConfig::load(&opts.config)?;
    let start = Instant::now();

    let data = reader::read_file(&config.mesh_file)?;
    info!(
        "mesh {}: {} points, {} triangles, {} boundary segments",
        config.mesh_file.display(),
        data.points.len(),
        data.triangles.len(),
        data.lines.len()
    );
    let mesh = Mesh::build(data)?;

    let mut sim = Simulation::new(mesh, config.parameters.clone());

    if let Some(dir) = &config.frame_dir {
        sim.add_sink(Box::new(FrameWriter::new(dir, sim.mesh())?));
    }
    if let Some(path) = &config.solution_file {
        sim.add_sink(Box::new(RestartWriter::new(path, sim.mesh())));
    }

    match &config.init {
        InitMode::Spill(center) => sim.seed_spill(*center),
        InitMode::Restart(path) => {
            let snapshot = restart::read_file(path)?;
            sim.seed_from_snapshot(&snapshot)?;
        }
    }

    sim.run()?;

    info!(
        "finished in {:.2} s with {} oil in the fishing grounds",
        start.elapsed().as_secs_f64(),
        sim.diagnostic()
    );
    Ok(())
}
