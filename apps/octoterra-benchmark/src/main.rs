//! Octoterra terrain generation benchmark.
//!
//! Generates one terrain and reports pool usage.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -p octoterra-benchmark -- [DEPTH] [SEED]
//! ```
//!
//! Defaults to depth 4 and seed 41233125. For timing over many runs use
//! `cargo bench -p octoterra-world`.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use anyhow::Context;
use octoterra_core::constants::CHUNK_VOXELS;
use octoterra_world::{Terrain, TerrainConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = TerrainConfig::default();
    if let Some(depth) = args.next() {
        config.depth = depth
            .parse()
            .with_context(|| format!("invalid depth {depth:?}"))?;
    }
    if let Some(seed) = args.next() {
        config.seed = seed
            .parse()
            .with_context(|| format!("invalid seed {seed:?}"))?;
    }

    info!("Octoterra Terrain Benchmark");
    let terrain = Terrain::new(&config).context("terrain generation failed")?;

    let nodes = terrain.node_pool();
    let chunks = terrain.chunk_pool();
    let world_voxels = u64::from(terrain.width()).pow(3);
    let stored_voxels = u64::from(chunks.len()) * CHUNK_VOXELS as u64;
    info!(
        "Node pool: {} / {} slots ({} KiB uploaded)",
        nodes.len(),
        nodes.capacity(),
        nodes.as_bytes().len() / 1024
    );
    info!(
        "Chunk pool: {} / {} slots ({} KiB uploaded)",
        chunks.len(),
        chunks.capacity(),
        chunks.as_bytes().len() / 1024
    );
    info!(
        "Chunks hold {stored_voxels} of {world_voxels} voxels ({:.3}%), {} classified cells, {:.1} MiB resident",
        stored_voxels as f64 * 100.0 / world_voxels as f64,
        terrain.stats().total_cells(),
        terrain.memory_usage() as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}
