//! Simulation data - materials and cells

// Re-export from sandfall-simulation so engine users need a single dependency
pub use sandfall_simulation::{
    Cell, CellFlags, MaterialDef, MaterialError, MaterialId, MaterialTableDef, Materials,
    MatterState,
};
