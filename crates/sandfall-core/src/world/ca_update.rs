//! Cellular automata update logic - material movement physics
//!
//! One rule per matter state. Each rule reads neighbors through
//! [`NeighborQueries`] and moves cells with [`Grid::swap`] / [`Grid::displace`],
//! tracking the moving cell's position across repeated steps.

use glam::IVec2;

use super::chemistry_system::ChemistrySystem;
use super::grid::Grid;
use super::neighbor_queries::{Dir, NeighborQueries};
use super::sim_params::SimParams;
use crate::simulation::{MaterialDef, Materials, MatterState};
use crate::world::{SimStats, WorldRng};

/// Spread of the per-tick gravity jitter
const GRAVITY_JITTER: (f32, f32) = (0.9, 1.1);

/// Keeps the gas drift chance finite when a gas matches air density
const DRIFT_EPSILON: f32 = 0.001;

/// Cellular automata updater - handles material movement physics
pub struct CellularAutomataUpdater;

impl CellularAutomataUpdater {
    /// Run the rule for the cell at `pos` unless it was already moved this tick
    ///
    /// Returns whether a rule was dispatched.
    pub fn update_cell<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        params: &SimParams,
        pos: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> bool {
        let cell = grid.cell(pos);
        if cell.has_simulated() || cell.material_id == materials.air_id() {
            return false;
        }

        stats.record_cell_simulated(pos);
        match materials.get(cell.material_id).state {
            MatterState::Solid => Self::update_solid(grid, materials, params, pos, stats, rng),
            MatterState::Liquid => Self::update_liquid(grid, materials, params, pos, stats, rng),
            MatterState::Gas => Self::update_gas(grid, materials, pos, stats, rng),
        }
        true
    }

    /// Update solid material (falls, slides off piles, rests)
    pub fn update_solid<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        params: &SimParams,
        pos: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let data = materials.get(grid.material_id(pos));
        if !data.uses_gravity {
            return;
        }

        let jitter = rng.gen_range_f32(GRAVITY_JITTER.0, GRAVITY_JITTER.1);
        let resting = NeighborQueries::is_solid(grid, materials, pos, Dir::DOWN);
        if !resting {
            grid.cell_mut(pos).add_velocity(
                Dir::DOWN.as_vec2() * params.gravity * jitter,
                params.max_velocity,
            );
        }

        // A resting cell gains no fall distance but may still slide off its support
        let mut steps = grid.cell_mut(pos).take_vertical_steps();
        if steps == 0 && resting {
            steps = 1;
        }
        let mut pos = pos;
        for _ in 0..steps {
            match Self::solid_step(grid, materials, pos, data, stats, rng) {
                Some(next) => pos = next,
                None => break,
            }
        }
    }

    /// One fall or slide; returns the new position, or None when resting
    fn solid_step<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        pos: IVec2,
        data: &MaterialDef,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> Option<IVec2> {
        if !NeighborQueries::is_solid(grid, materials, pos, Dir::DOWN) {
            return Some(Self::expel(grid, materials, pos, Dir::DOWN, stats));
        }

        let dir = Self::random_diagonal_down(rng);
        for side in [dir, Dir::invert_x(dir)] {
            if NeighborQueries::is_solid(grid, materials, pos, side) {
                continue;
            }

            if data.stacking_height <= 1 {
                return Some(Self::expel(grid, materials, pos, side, stats));
            }

            // Tall piles only slide when the drop beside them is open all the way down
            if NeighborQueries::depth_check(
                grid,
                materials,
                pos + side,
                data.stacking_height,
                MatterState::Gas,
            ) {
                return Some(Self::expel(grid, materials, pos, side + Dir::DOWN, stats));
            }
        }

        None
    }

    /// Update liquid material (corrodes, falls, spreads sideways)
    pub fn update_liquid<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        params: &SimParams,
        pos: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let material_id = grid.material_id(pos);
        let data = materials.get(material_id);

        if ChemistrySystem::try_corrode_surrounding(grid, materials, pos, stats, rng)
            && grid.material_id(pos) != material_id
        {
            return;
        }

        let dir = Self::random_diagonal_down(rng);
        let mut pos = pos;
        let mut has_fallen = false;

        for _ in 0..params.liquid_side_velocity {
            if !has_fallen && NeighborQueries::is_open_for_liquid(grid, materials, pos, Dir::DOWN, data) {
                pos = Self::expel(grid, materials, pos, Dir::DOWN, stats);
                has_fallen = true;
            }

            if NeighborQueries::is_open_for_liquid(grid, materials, pos, dir, data) {
                pos = Self::expel(grid, materials, pos, dir, stats);
            } else if NeighborQueries::is_open_for_liquid(grid, materials, pos, Dir::invert_x(dir), data) {
                pos = Self::expel(grid, materials, pos, Dir::invert_x(dir), stats);
            } else {
                pos = Self::flow_sideways(grid, materials, params, pos, data, stats, rng);
            }
        }
    }

    /// Horizontal spreading of a liquid that can't go down
    fn flow_sideways<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        params: &SimParams,
        pos: IVec2,
        data: &MaterialDef,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> IVec2 {
        // Inside a pool the stepdown lookahead is skipped and the previous heading kept
        let embedded = NeighborQueries::is_same(grid, materials, pos, Dir::UP)
            && NeighborQueries::is_same(grid, materials, pos, Dir::RIGHT)
            && NeighborQueries::is_same(grid, materials, pos, Dir::LEFT);
        if !embedded {
            let stepdown = NeighborQueries::stepdown_direction(
                grid,
                materials,
                pos,
                data.id,
                params.stepdown_size,
                params.stepdown_steps,
            );
            if stepdown != 0 {
                grid.cell_mut(pos).velocity = Dir::RIGHT.as_vec2() * stepdown as f32;
            }
        }

        let mut heading = grid.cell(pos).velocity.x;
        if heading == 0.0 {
            heading = if rng.gen_bool() { 1.0 } else { -1.0 };
        }

        let forward = if heading > 0.0 { Dir::RIGHT } else { Dir::LEFT };
        let target = if NeighborQueries::is_open_for_liquid(grid, materials, pos, forward, data) {
            Some(forward)
        } else if NeighborQueries::is_open_for_liquid(grid, materials, pos, Dir::invert_x(forward), data) {
            heading = -heading;
            Some(Dir::invert_x(forward))
        } else {
            heading = 0.0;
            None
        };

        grid.cell_mut(pos).velocity.x = heading;
        match target {
            Some(side) => {
                grid.swap(pos, pos + side);
                stats.record_cell_moved();
                pos + side
            }
            None => pos,
        }
    }

    /// Update gas material (drifts sideways, rises through denser gas)
    pub fn update_gas<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        pos: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let data = materials.get(grid.material_id(pos));
        if !data.uses_gravity {
            return;
        }

        let diagonal = if rng.gen_bool() { Dir::UP_RIGHT } else { Dir::UP_LEFT };
        let horizontal = if rng.gen_bool() { Dir::RIGHT } else { Dir::LEFT };

        let mut pos = pos;
        if rng.check_probability(Self::drift_chance(materials.air(), data))
            && NeighborQueries::is_higher_density_gas(grid, materials, pos, horizontal, data)
        {
            grid.swap(pos, pos + horizontal);
            stats.record_cell_moved();
            pos += horizontal;
        }

        for dir in [
            Dir::UP,
            diagonal,
            Dir::invert_x(diagonal),
            horizontal,
            Dir::invert_x(horizontal),
        ] {
            if NeighborQueries::is_higher_density_gas(grid, materials, pos, dir, data) {
                Self::expel(grid, materials, pos, dir, stats);
                return;
            }
        }
    }

    /// Probability that a gas swaps sideways before rising
    ///
    /// Approaches 1 as the gas gets lighter than air and is 0 at equal
    /// density. A gas denser than air gets 1, so it always tries the drift.
    pub fn drift_chance(air: &MaterialDef, gas: &MaterialDef) -> f32 {
        let difference = (i64::from(air.density) - i64::from(gas.density)) as f32;
        (1.0 - 1.0 / (difference + DRIFT_EPSILON)).clamp(0.0, 1.0)
    }

    fn random_diagonal_down<R: WorldRng>(rng: &mut R) -> IVec2 {
        if rng.gen_bool() {
            Dir::DOWN_RIGHT
        } else {
            Dir::DOWN_LEFT
        }
    }

    /// Displace into `pos + dir` and return the mover's new position
    fn expel(
        grid: &mut Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        stats: &mut dyn SimStats,
    ) -> IVec2 {
        grid.displace(materials, pos, dir);
        stats.record_cell_moved();
        pos + dir
    }
}
