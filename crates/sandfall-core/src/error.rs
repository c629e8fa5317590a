//! Errors surfaced by the engine
//!
//! Everything here is raised at setup or at the host-facing boundary. Steady
//! state ticking has no recoverable errors.

use thiserror::Error;

use crate::simulation::MaterialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid simulation parameter `{name}`: {reason}")]
    InvalidParams { name: &'static str, reason: String },

    #[error("material id {0} is not registered")]
    UnknownMaterial(u16),

    #[error(transparent)]
    InvalidMaterialTable(#[from] MaterialError),

    #[error("an incremental tick is already in progress")]
    TickInProgress,
}
