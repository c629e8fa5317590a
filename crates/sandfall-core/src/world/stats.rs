//! Simulation statistics collection trait

use glam::IVec2;

/// Trait for collecting simulation statistics
///
/// Hosts that don't care pass [`NoopStats`]; tests use it to instrument
/// rule invocations.
pub trait SimStats {
    /// Record that an update rule ran for the cell at `pos`
    fn record_cell_simulated(&mut self, pos: IVec2);

    /// Record that a cell was swapped with a neighbor
    fn record_cell_moved(&mut self);

    /// Record that a corrosion event dissolved a neighbor
    fn record_corrosion(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_cell_simulated(&mut self, _pos: IVec2) {}
    fn record_cell_moved(&mut self) {}
    fn record_corrosion(&mut self) {}
}

/// Running totals, reset by the host whenever it wants a fresh window
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub cells_simulated: u64,
    pub cells_moved: u64,
    pub corrosions: u64,
}

impl TickStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl SimStats for TickStats {
    fn record_cell_simulated(&mut self, _pos: IVec2) {
        self.cells_simulated += 1;
    }

    fn record_cell_moved(&mut self) {
        self.cells_moved += 1;
    }

    fn record_corrosion(&mut self) {
        self.corrosions += 1;
    }
}
