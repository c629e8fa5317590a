//! Simulation parameters - grid size and physics tuning fixed at startup
//!
//! Serializable to RON so hosts can layer them from files and environment.

use serde::{Deserialize, Serialize};

use crate::SimError;

/// Row order within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalScan {
    /// Row 0 (the bottom) first
    #[default]
    BottomUp,
    /// Top row first
    TopDown,
}

/// Grid dimensions and physics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,

    /// Downward acceleration added to a falling solid each tick (cells/tick²)
    pub gravity: f32,
    /// Vertical speed cap (cells/tick)
    pub max_velocity: f32,

    /// Horizontal flow attempts per liquid cell per tick
    pub liquid_side_velocity: u32,
    /// Spacing between stepdown samples
    pub stepdown_size: i32,
    /// Number of stepdown samples on each side
    pub stepdown_steps: u32,

    /// Target ticks per second for gated updates
    pub tick_rate: f32,
    /// Cap on catch-up ticks per update call
    pub max_steps_per_update: u32,
    pub vertical_scan: VerticalScan,

    /// Brush half-extent for scene strokes and emitters that omit one
    pub brush_size: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
            gravity: 0.4,
            max_velocity: 1.0,
            liquid_side_velocity: 1,
            stepdown_size: 5,
            stepdown_steps: 10,
            tick_rate: 30.0,
            max_steps_per_update: 2,
            vertical_scan: VerticalScan::BottomUp,
            brush_size: 1,
        }
    }
}

impl SimParams {
    /// Same tuning, different grid size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Seconds between gated ticks
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        // Linear scan indices are i32-addressable
        if (self.width as u64) * (self.height as u64) > i32::MAX as u64 {
            return Err(SimError::InvalidParams {
                name: "width/height",
                reason: format!("{}x{} cells is too many", self.width, self.height),
            });
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SimError::InvalidParams {
                name: "gravity",
                reason: format!("must be finite and non-negative, got {}", self.gravity),
            });
        }
        if !self.max_velocity.is_finite() || self.max_velocity <= 0.0 {
            return Err(SimError::InvalidParams {
                name: "max_velocity",
                reason: format!("must be finite and positive, got {}", self.max_velocity),
            });
        }
        if self.stepdown_size < 1 {
            return Err(SimError::InvalidParams {
                name: "stepdown_size",
                reason: format!("must be at least 1, got {}", self.stepdown_size),
            });
        }
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(SimError::InvalidParams {
                name: "tick_rate",
                reason: format!("must be finite and positive, got {}", self.tick_rate),
            });
        }
        if self.max_steps_per_update == 0 {
            return Err(SimError::InvalidParams {
                name: "max_steps_per_update",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
