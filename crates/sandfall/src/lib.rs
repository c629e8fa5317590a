//! # Sandfall - headless driver
//!
//! Loads configuration and scenes, runs the falling-sand simulation without a
//! window and renders the result to a pixel buffer, PNG or text.

pub mod config;
pub mod render;
pub mod runner;
pub mod scene;

pub use config::SandfallConfig;
pub use render::PixelRenderer;
pub use runner::{RunOptions, RunSummary};
pub use scene::Scene;
