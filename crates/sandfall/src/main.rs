use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sandfall::render::ascii_snapshot;
use sandfall::runner::{self, RunOptions};
use sandfall::{PixelRenderer, SandfallConfig, Scene};
use sandfall_core::world::World;
use sandfall_simulation::Materials;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene file (RON); a built-in demo scene is used when absent
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Custom material table (RON)
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Config file replacing the optional sandfall.ron layer
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate (overrides scene and config)
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Drive ticks through the interruptible scheduler
    #[arg(long)]
    incremental: bool,

    /// Print a text snapshot of the final grid
    #[arg(long)]
    print: bool,

    /// Write the final frame as PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// List the material table and exit
    #[arg(long)]
    list_materials: bool,
}

fn load_materials(path: Option<&PathBuf>) -> Result<Materials> {
    let Some(path) = path else {
        return Ok(Materials::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read material table: {}", path.display()))?;
    Materials::from_ron_str(&content)
        .with_context(|| format!("Failed to load material table: {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let materials = load_materials(args.materials.as_ref())?;

    if args.list_materials {
        for def in materials.iter() {
            println!(
                "{:>3}  {:<10} {:?}  density {:>5}  gravity {}",
                def.id, def.name, def.state, def.density, def.uses_gravity
            );
        }
        return Ok(());
    }

    let config = SandfallConfig::load(args.config.as_deref())?;

    let scene = match &args.scene {
        Some(path) => Scene::from_file(path)?,
        None => Scene::demo(),
    };

    let mut params = config.sim.clone();
    if let Some(width) = scene.width {
        params.width = width;
    }
    if let Some(height) = scene.height {
        params.height = height;
    }

    let mut world = World::new(params, materials).context("Failed to create world")?;
    scene.validate_materials(&world)?;
    scene.apply_strokes(&mut world)?;

    let options = RunOptions {
        ticks: args.ticks.or(scene.ticks).unwrap_or(config.run.ticks),
        seed: args.seed.unwrap_or(config.run.seed),
        incremental: args.incremental || config.run.incremental,
        show_progress: std::io::stderr().is_terminal(),
    };

    log::info!(
        "Running scene '{}' for {} ticks (seed {}, {})",
        scene.name,
        options.ticks,
        options.seed,
        if options.incremental { "incremental" } else { "synchronous" }
    );

    let mut renderer = PixelRenderer::for_world(&world);
    let summary = runner::run(&mut world, &scene, &mut renderer, &options)?;

    log::info!(
        "Finished {} ticks: {} cells simulated, {} moves, {} corrosions, {} redraws",
        summary.ticks,
        summary.stats.cells_simulated,
        summary.stats.cells_moved,
        summary.stats.corrosions,
        summary.redraw_cells
    );
    if summary.emitted_cells > 0 {
        log::info!("Emitters painted {} cells", summary.emitted_cells);
    }
    if options.incremental {
        log::info!("Interruptible scheduler yielded {} times", summary.yields);
    }
    for (name, count) in runner::census(&world) {
        log::info!("  {name:<10} {count}");
    }

    if args.print {
        print!("{}", ascii_snapshot(&world));
    }

    if let Some(path) = &args.png {
        renderer.save_png(path)?;
        log::info!("Saved frame to {}", path.display());
    }

    Ok(())
}
