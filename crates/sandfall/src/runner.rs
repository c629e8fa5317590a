//! Headless run loop
//!
//! Drives a world through a scene: emitters fire before each tick, the tick
//! runs synchronously or through the interruptible scheduler, and the
//! renderer pulls the redraw list once the tick is done.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sandfall_core::world::{SimRng, TickProgress, TickStats, World, seeded_rng};

use crate::render::PixelRenderer;
use crate::scene::Scene;

/// How to drive the run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ticks: u64,
    pub seed: u64,
    pub incremental: bool,
    pub show_progress: bool,
}

/// Totals gathered over a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub stats: TickStats,
    /// Redraw entries consumed by the renderer
    pub redraw_cells: u64,
    /// Cells painted by emitters
    pub emitted_cells: u64,
    /// Yields of the interruptible scheduler (0 in synchronous mode)
    pub yields: u64,
}

fn progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ticks ({eta}) {msg}")
        .context("Invalid progress bar template")?
        .progress_chars("=> "))
}

/// Run `options.ticks` ticks of `scene` on `world`
///
/// The scene's strokes must already be painted; this only fires emitters.
pub fn run(
    world: &mut World,
    scene: &Scene,
    renderer: &mut PixelRenderer,
    options: &RunOptions,
) -> Result<RunSummary> {
    let pb = if options.show_progress {
        let pb = ProgressBar::new(options.ticks);
        pb.set_style(progress_style()?);
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut rng = seeded_rng(options.seed);
    let mut summary = RunSummary::default();
    summary.redraw_cells += renderer.sync(world) as u64;

    for _ in 0..options.ticks {
        let tick = world.tick_count();
        summary.emitted_cells += scene.emit(world, tick)? as u64;

        if options.incremental {
            summary.yields += run_incremental_tick(world, &mut summary.stats, &mut rng);
        } else {
            world
                .step(&mut summary.stats, &mut rng)
                .with_context(|| format!("Tick {tick} failed"))?;
        }

        summary.redraw_cells += renderer.sync(world) as u64;
        summary.ticks += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(summary)
}

fn run_incremental_tick(world: &mut World, stats: &mut TickStats, rng: &mut SimRng) -> u64 {
    let mut yields = 0;
    while let TickProgress::Yielded { .. } = world.resume_tick(stats, rng) {
        yields += 1;
    }
    yields
}

/// Cell count per material present in the world, in table order
pub fn census(world: &World) -> Vec<(String, usize)> {
    world
        .materials()
        .iter()
        .map(|def| (def.name.clone(), world.grid().count_material(def.id)))
        .filter(|(_, count)| *count > 0)
        .collect()
}
