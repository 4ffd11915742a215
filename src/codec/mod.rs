//! Bitstream codec and per-version constant tables
//!
//! - BitStream: MSB-first append/read bit buffer
//! - segment: mode validation and payload packing (encode direction)
//! - text: payload unpacking (decode direction)
//! - tables: capacity, block layout, alignment centers (spec tables)

/// MSB-first bit buffer
pub mod bitstream;
/// Segment packing and pad bytes
pub mod segment;
/// Version/capacity/block-layout tables
pub mod tables;
/// Segment unpacking back to text
pub mod text;
