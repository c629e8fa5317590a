//! Neighbor lookups relative to a grid position
//!
//! Every query resolves out-of-range coordinates to the wall material, so the
//! update rules never branch on bounds themselves.

use glam::IVec2;

use super::grid::Grid;
use crate::simulation::{MaterialDef, Materials, MatterState};

/// Unit offsets in grid space (y grows upward)
pub struct Dir;

impl Dir {
    pub const UP: IVec2 = IVec2::new(0, 1);
    pub const DOWN: IVec2 = IVec2::new(0, -1);
    pub const LEFT: IVec2 = IVec2::new(-1, 0);
    pub const RIGHT: IVec2 = IVec2::new(1, 0);
    pub const UP_LEFT: IVec2 = IVec2::new(-1, 1);
    pub const UP_RIGHT: IVec2 = IVec2::new(1, 1);
    pub const DOWN_LEFT: IVec2 = IVec2::new(-1, -1);
    pub const DOWN_RIGHT: IVec2 = IVec2::new(1, -1);

    /// Mirror horizontally
    #[inline]
    pub fn invert_x(dir: IVec2) -> IVec2 {
        IVec2::new(-dir.x, dir.y)
    }
}

/// Neighbor query utilities - stateless methods over a grid and material table
pub struct NeighborQueries;

impl NeighborQueries {
    /// Material id at `pos + dir`, or the wall id outside the grid
    #[inline]
    pub fn material_id_at(grid: &Grid, materials: &Materials, pos: IVec2, dir: IVec2) -> u16 {
        grid.get(pos + dir)
            .map_or(materials.wall_id(), |cell| cell.material_id)
    }

    /// Material at `pos + dir`, or the wall outside the grid
    #[inline]
    pub fn material_at<'a>(
        grid: &Grid,
        materials: &'a Materials,
        pos: IVec2,
        dir: IVec2,
    ) -> &'a MaterialDef {
        materials.get(Self::material_id_at(grid, materials, pos, dir))
    }

    #[inline]
    pub fn has_state(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        state: MatterState,
    ) -> bool {
        Self::material_at(grid, materials, pos, dir).state == state
    }

    #[inline]
    pub fn is_solid(grid: &Grid, materials: &Materials, pos: IVec2, dir: IVec2) -> bool {
        Self::has_state(grid, materials, pos, dir, MatterState::Solid)
    }

    #[inline]
    pub fn is_gas(grid: &Grid, materials: &Materials, pos: IVec2, dir: IVec2) -> bool {
        Self::has_state(grid, materials, pos, dir, MatterState::Gas)
    }

    /// Target is a liquid lighter than `data`
    pub fn is_lower_density_liquid(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        data: &MaterialDef,
    ) -> bool {
        let target = Self::material_at(grid, materials, pos, dir);
        target.is_liquid() && target.density < data.density
    }

    /// Target is a gas denser than `data`
    pub fn is_higher_density_gas(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        data: &MaterialDef,
    ) -> bool {
        let target = Self::material_at(grid, materials, pos, dir);
        target.is_gas() && target.density > data.density
    }

    /// Target shares the state of `data` and is lighter
    pub fn is_lower_density_same_state(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        data: &MaterialDef,
    ) -> bool {
        let target = Self::material_at(grid, materials, pos, dir);
        target.state == data.state && target.density < data.density
    }

    /// Whether a liquid could flow into the target: any gas, or a lighter liquid
    #[inline]
    pub fn is_open_for_liquid(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        dir: IVec2,
        data: &MaterialDef,
    ) -> bool {
        Self::is_gas(grid, materials, pos, dir)
            || Self::is_lower_density_liquid(grid, materials, pos, dir, data)
    }

    /// `pos + dir` holds the same material as `pos`
    pub fn is_same(grid: &Grid, materials: &Materials, pos: IVec2, dir: IVec2) -> bool {
        Self::material_id_at(grid, materials, pos, IVec2::ZERO)
            == Self::material_id_at(grid, materials, pos, dir)
    }

    /// The `depth` cells directly below `start` all have `state`
    ///
    /// Everything below row 0 is wall, so the walk stops one cell past the
    /// bottom row; deeper cells would answer the same.
    pub fn depth_check(
        grid: &Grid,
        materials: &Materials,
        start: IVec2,
        depth: u32,
        state: MatterState,
    ) -> bool {
        let to_floor = start.y.max(0).saturating_add(1);
        let depth = i32::try_from(depth).unwrap_or(i32::MAX).min(to_floor);
        (1..=depth).all(|i| Self::has_state(grid, materials, start, Dir::DOWN * i, state))
    }

    /// Direction (+1 right, -1 left, 0 none) toward the nearest open terrain one row down
    ///
    /// Samples sit `size`, `2 * size`, ... `steps * size` cells to each side.
    /// A sample counts when it holds neither the liquid's own material nor the
    /// wall. The right sample wins ties.
    pub fn stepdown_direction(
        grid: &Grid,
        materials: &Materials,
        pos: IVec2,
        material_id: u16,
        size: i32,
        steps: u32,
    ) -> i32 {
        let wall = materials.wall_id();
        let differs = |dir: IVec2| {
            let id = Self::material_id_at(grid, materials, pos, dir);
            id != material_id && id != wall
        };

        // Past the grid width both samples are wall, and so is every later pair
        let max_offset = i64::from(grid.width());
        for k in 1..=i64::from(steps) {
            let offset = k * i64::from(size);
            if offset > max_offset {
                break;
            }
            let offset = offset as i32;
            if differs(IVec2::new(offset, -1)) {
                return 1;
            }
            if differs(IVec2::new(-offset, -1)) {
                return -1;
            }
        }
        0
    }
}
