//! World - owns the grid and drives ticks

use glam::IVec2;

use super::ca_update::CellularAutomataUpdater;
use super::grid::{Grid, RedrawCell};
use super::neighbor_queries::NeighborQueries;
use super::scan_order::ScanOrder;
use super::sim_params::SimParams;
use crate::SimError;
use crate::simulation::{Cell, MaterialDef, Materials};
use crate::world::{SimStats, WorldRng};

/// Result of one [`World::resume_tick`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickProgress {
    /// Stopped after an occupied cell; more of the pass remains
    Yielded {
        /// Scan positions visited by this call
        processed: usize,
    },
    /// The pass finished and the tick counter advanced
    Complete,
}

/// Cursor of an interruptible pass
#[derive(Debug, Clone, Copy)]
struct IncrementalTick {
    order: ScanOrder,
    next_index: usize,
}

/// The simulated world: a fixed grid, its material table and tick state
pub struct World {
    grid: Grid,
    materials: Materials,
    params: SimParams,

    /// Completed ticks; parity selects the horizontal scan direction
    tick_count: u64,

    /// Simulation time accumulator for [`World::update`]
    time_accumulator: f32,

    /// In-flight interruptible pass, if any
    incremental: Option<IncrementalTick>,
}

impl World {
    /// Create a world filled with air
    ///
    /// Fails when the parameters are invalid; the material table is already
    /// validated by construction.
    pub fn new(params: SimParams, materials: Materials) -> Result<Self, SimError> {
        params.validate()?;
        let grid = Grid::new(params.width, params.height, materials.air_id())?;

        log::info!(
            "World created: {}x{} cells, {} materials, {} ticks/s",
            params.width,
            params.height,
            materials.len(),
            params.tick_rate
        );

        Ok(Self {
            grid,
            materials,
            params,
            tick_count: 0,
            time_accumulator: 0.0,
            incremental: None,
        })
    }

    /// World with default tuning and the built-in material table
    pub fn with_size(width: u32, height: u32) -> Result<Self, SimError> {
        Self::new(SimParams::with_size(width, height), Materials::new())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_tick_in_progress(&self) -> bool {
        self.incremental.is_some()
    }

    /// Material at `pos`; the wall for positions outside the grid
    pub fn material_at(&self, pos: IVec2) -> &MaterialDef {
        NeighborQueries::material_at(&self.grid, &self.materials, pos, IVec2::ZERO)
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.grid.get(pos)
    }

    /// Run one full synchronous pass over the grid
    pub fn step<R: WorldRng>(&mut self, stats: &mut dyn SimStats, rng: &mut R) -> Result<(), SimError> {
        if self.incremental.is_some() {
            return Err(SimError::TickInProgress);
        }

        let order = self.begin_pass();
        let (width, height) = (self.grid.width(), self.grid.height());
        for index in 0..self.grid.len() {
            let pos = order.position(index, width, height);
            CellularAutomataUpdater::update_cell(
                &mut self.grid,
                &self.materials,
                &self.params,
                pos,
                stats,
                rng,
            );
        }
        self.finish_pass(order);
        Ok(())
    }

    /// Advance by real time `dt` (seconds) at the configured tick rate
    ///
    /// Runs at most `max_steps_per_update` ticks per call and drops backlog
    /// beyond that, so a slow host slows the simulation down instead of
    /// spiraling. Returns the number of ticks run.
    pub fn update<R: WorldRng>(
        &mut self,
        dt: f32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> Result<u32, SimError> {
        if self.incremental.is_some() {
            return Err(SimError::TickInProgress);
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring invalid frame time {dt}");
            return Ok(0);
        }

        let interval = self.params.tick_interval();
        let max_steps = self.params.max_steps_per_update;
        self.time_accumulator += dt;

        let mut steps = 0;
        while self.time_accumulator >= interval && steps < max_steps {
            self.step(stats, rng)?;
            self.time_accumulator -= interval;
            steps += 1;
        }

        // Clamp accumulator to prevent runaway
        if self.time_accumulator > interval * max_steps as f32 {
            self.time_accumulator = interval;
        }

        Ok(steps)
    }

    /// Start an interruptible pass
    pub fn begin_incremental_tick(&mut self) -> Result<(), SimError> {
        if self.incremental.is_some() {
            return Err(SimError::TickInProgress);
        }

        let order = self.begin_pass();
        self.incremental = Some(IncrementalTick {
            order,
            next_index: 0,
        });
        Ok(())
    }

    /// Continue the interruptible pass until one occupied cell has been visited
    ///
    /// Starts a pass when none is in flight. The grid is fully consistent
    /// whenever this returns.
    pub fn resume_tick<R: WorldRng>(&mut self, stats: &mut dyn SimStats, rng: &mut R) -> TickProgress {
        let mut tick = match self.incremental {
            Some(tick) => tick,
            None => {
                let order = self.begin_pass();
                IncrementalTick {
                    order,
                    next_index: 0,
                }
            }
        };

        let (width, height) = (self.grid.width(), self.grid.height());
        let air = self.materials.air_id();
        let start = tick.next_index;

        while tick.next_index < self.grid.len() {
            let pos = tick.order.position(tick.next_index, width, height);
            tick.next_index += 1;

            let occupied = self.grid.material_id(pos) != air;
            CellularAutomataUpdater::update_cell(
                &mut self.grid,
                &self.materials,
                &self.params,
                pos,
                stats,
                rng,
            );

            if occupied && tick.next_index < self.grid.len() {
                self.incremental = Some(tick);
                return TickProgress::Yielded {
                    processed: tick.next_index - start,
                };
            }
        }

        self.incremental = None;
        self.finish_pass(tick.order);
        TickProgress::Complete
    }

    /// Drop the in-flight interruptible pass
    ///
    /// Cells visited so far keep their updates; the tick counter does not advance.
    pub fn abandon_incremental_tick(&mut self) {
        if let Some(tick) = self.incremental.take() {
            log::debug!(
                "Abandoned tick {} after {}/{} cells",
                self.tick_count,
                tick.next_index,
                self.grid.len()
            );
        }
    }

    /// Paint a square of `material_id` with half-extent `radius` around `center`
    ///
    /// The square is clipped to the grid. Returns the number of cells written.
    pub fn apply_brush(&mut self, center: IVec2, radius: u32, material_id: u16) -> Result<usize, SimError> {
        if !self.materials.contains(material_id) {
            return Err(SimError::UnknownMaterial(material_id));
        }

        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let max_x = self.grid.width() as i32 - 1;
        let max_y = self.grid.height() as i32 - 1;
        let x0 = center.x.saturating_sub(radius).max(0);
        let x1 = center.x.saturating_add(radius).min(max_x);
        let y0 = center.y.saturating_sub(radius).max(0);
        let y1 = center.y.saturating_add(radius).min(max_y);

        let mut written = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.grid.set_material(IVec2::new(x, y), material_id);
                written += 1;
            }
        }

        let side = 2 * i64::from(radius) + 1;
        let full = side.saturating_mul(side);
        if (written as i64) < full {
            log::warn!("Brush at {center} radius {radius} clipped to grid: {written}/{full} cells");
        }
        log::debug!(
            "Brush painted {written} cells of {} at {center}",
            self.materials.get(material_id).name
        );

        Ok(written)
    }

    /// Reset every cell to air
    pub fn clear(&mut self) {
        self.grid.fill(self.materials.air_id());
        log::debug!("World cleared");
    }

    /// Renderer pull: every cell that changed since the last pull
    ///
    /// Safe between the yields of an interruptible tick; cells moved during
    /// the pass keep their tick guard and show up again in the next pull.
    pub fn take_redraw(&mut self) -> Vec<RedrawCell> {
        if self.incremental.is_some() {
            self.grid.take_redraw_in_tick(&self.materials)
        } else {
            self.grid.take_redraw(&self.materials)
        }
    }

    fn begin_pass(&mut self) -> ScanOrder {
        self.grid.begin_tick();
        ScanOrder::for_tick(self.tick_count, self.params.vertical_scan)
    }

    fn finish_pass(&mut self, order: ScanOrder) {
        log::debug!("Tick {} complete ({order:?})", self.tick_count);
        self.tick_count += 1;
    }
}
