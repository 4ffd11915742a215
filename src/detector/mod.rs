//! Symbol location in raster images
//!
//! - Finder pattern detection (1:1:3:1:1 run scanning with cross-checks)
//! - Alignment pattern search for V2+
//! - Orientation, version estimation, perspective sampling

/// Alignment pattern search window
pub mod alignment;
/// Finder pattern detection
pub mod finder;
/// Orientation and module sampling
pub mod sampler;
