//! Material data and cell state for sandfall
//!
//! This crate provides the foundational data types for the simulation:
//! - Material definitions (MaterialId, MaterialDef, Materials)
//! - Matter states that select an update rule (MatterState)
//! - Grid cell state (Cell, CellFlags)

mod cell;
mod materials;

pub use cell::{Cell, CellFlags};
pub use materials::{
    MaterialDef, MaterialError, MaterialId, MaterialTableDef, Materials, MatterState,
};
