//! Error correction layers
//!
//! - GF(256) scalar and polynomial arithmetic (primitive polynomial 0x11D)
//! - Reed-Solomon codec for data codewords
//! - BCH codecs for the format and version info fields

/// BCH(15,5) format info and BCH(18,6) version info
pub mod bch;
/// GF(2^8) field and polynomial arithmetic
pub mod gf256;
/// Reed-Solomon encoder and decoder
pub mod reed_solomon;
