//! Image processing utilities
//!
//! - Grayscale conversion (RGBA to luminance)
//! - Binarization (Otsu's method)
//! - Geometry (perspective transforms)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
