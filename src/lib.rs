//! Brand color catalog with image-driven color extraction.

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod color;
pub mod error;
pub mod sampler;
pub mod session;
pub mod tui;

pub use error::PaletteError;
