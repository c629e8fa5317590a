//! Grid cell state
//!
//! A cell is one grid slot: the occupying material plus the transient state
//! the update rules carry from tick to tick.

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Per-tick bookkeeping flags
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        /// Already processed (or moved into) during the current tick
        const SIMULATED = 1 << 0;
        /// Occupant changed since the renderer last pulled this cell
        const NEEDS_REDRAW = 1 << 1;
    }
}

/// A single cell in the grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Current occupant
    pub material_id: u16,
    /// Current speed; y is clamped to the configured maximum, x carries liquid flow direction
    pub velocity: Vec2,
    /// Integrated vertical movement not yet turned into whole-cell steps
    pub fall_accumulator: f32,
    pub flags: CellFlags,
}

impl Cell {
    pub fn new(material_id: u16) -> Self {
        Self {
            material_id,
            velocity: Vec2::ZERO,
            fall_accumulator: 0.0,
            flags: CellFlags::NEEDS_REDRAW,
        }
    }

    /// Replace the occupant and drop any motion state
    pub fn set_material(&mut self, material_id: u16) {
        self.material_id = material_id;
        self.velocity = Vec2::ZERO;
        self.fall_accumulator = 0.0;
        self.flags.insert(CellFlags::NEEDS_REDRAW);
    }

    /// Add to velocity, clamp the vertical component and integrate it
    pub fn add_velocity(&mut self, delta: Vec2, max_velocity: f32) {
        self.velocity += delta;
        self.velocity.y = self.velocity.y.clamp(-max_velocity, max_velocity);
        self.fall_accumulator += self.velocity.y;
    }

    /// Remove the whole-cell part of the fall accumulator
    ///
    /// Returns how many cells to move this tick. The fractional remainder
    /// stays for the next tick.
    pub fn take_vertical_steps(&mut self) -> u32 {
        let whole = self.fall_accumulator.trunc();
        if whole == 0.0 {
            return 0;
        }
        self.fall_accumulator -= whole;
        whole.abs() as u32
    }

    #[inline]
    pub fn has_simulated(&self) -> bool {
        self.flags.contains(CellFlags::SIMULATED)
    }

    #[inline]
    pub fn mark_simulated(&mut self) {
        self.flags.insert(CellFlags::SIMULATED);
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.flags.contains(CellFlags::NEEDS_REDRAW)
    }

    /// Whether the renderer should pick this cell up
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.flags
            .intersects(CellFlags::SIMULATED | CellFlags::NEEDS_REDRAW)
    }
}
