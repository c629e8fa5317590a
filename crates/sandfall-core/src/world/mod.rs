//! World management - grid, update rules and tick scheduling

mod ca_update;
mod chemistry_system;
mod grid;
mod neighbor_queries;
pub mod rng_trait;
mod scan_order;
mod sim_params;
pub mod stats;
#[allow(clippy::module_inception)]
mod world;

pub use ca_update::CellularAutomataUpdater;
pub use chemistry_system::ChemistrySystem;
pub use grid::{Grid, RedrawCell};
pub use neighbor_queries::{Dir, NeighborQueries};
pub use rng_trait::{SimRng, WorldRng, seeded_rng};
pub use scan_order::ScanOrder;
pub use sim_params::{SimParams, VerticalScan};
pub use stats::{NoopStats, SimStats, TickStats};
pub use world::{TickProgress, World};
