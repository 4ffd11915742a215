//! qrgrid - deterministic QR code engine
//!
//! Encodes text payloads into ISO/IEC 18004 Model 2 module grids and
//! decodes such grids back out of noisy RGBA raster images, tolerating
//! geometric distortion and corruption up to the Reed-Solomon capacity.
//!
//! The core is pure: no files, no env vars, no global mutable state. The
//! only process-wide data are the read-only GF(256) and capacity tables,
//! so concurrent calls from different threads need no coordination.

/// Bitstream codec and per-version tables
pub mod codec;
/// Matrix-to-text decode pipeline
pub mod decoder;
/// Finder detection and perspective sampling
pub mod detector;
/// Diagnostic sink passed through the pipelines
pub mod diag;
/// GF(256), Reed-Solomon, and BCH codecs
pub mod ec;
/// Text-to-matrix encode pipeline
pub mod encoder;
/// Error taxonomy
pub mod error;
/// Advisory quality grades
pub mod grading;
/// Core data structures
pub mod models;
/// Grayscale, binarization, geometry
pub mod utils;

pub use diag::{DiagEvent, DiagnosticSink, NopSink};
pub use error::{Error, QrResult};
pub use models::{BitMatrix, DecodeResult, ECLevel, MaskPattern, Mode, Symbol};

use detector::finder::FinderDetector;
use detector::sampler::{Sampler, orient_patterns};
use utils::binarization::{binarize, otsu_threshold};
use utils::grayscale::rgba_to_grayscale;

/// Encode `text` into a QR symbol.
///
/// The caller chooses the mode and EC level; `version` pins the symbol
/// size, or `None` picks the smallest version that fits. The mask is
/// always chosen by penalty scoring.
pub fn encode(text: &str, mode: Mode, ec_level: ECLevel, version: Option<u8>) -> QrResult<Symbol> {
    encoder::encode(text, mode, ec_level, version, &NopSink)
}

/// `encode` with diagnostic checkpoints delivered to `sink`
pub fn encode_with_sink(
    text: &str,
    mode: Mode,
    ec_level: ECLevel,
    version: Option<u8>,
    sink: &dyn DiagnosticSink,
) -> QrResult<Symbol> {
    encoder::encode(text, mode, ec_level, version, sink)
}

/// Decode the QR symbol in an RGBA image (4 bytes per pixel).
pub fn decode(pixels: &[u8], width: usize, height: usize) -> QrResult<DecodeResult> {
    decode_impl(pixels, width, height, None, 40, &NopSink)
}

/// `decode` with diagnostic checkpoints delivered to `sink`
pub fn decode_with_sink(
    pixels: &[u8],
    width: usize,
    height: usize,
    sink: &dyn DiagnosticSink,
) -> QrResult<DecodeResult> {
    decode_impl(pixels, width, height, None, 40, sink)
}

/// Decode restricted to the pixel rectangle [x0, x1) x [y0, y1), capping
/// version estimation at `max_version`.
#[allow(clippy::too_many_arguments)]
pub fn decode_region(
    pixels: &[u8],
    width: usize,
    height: usize,
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
    max_version: u8,
) -> QrResult<DecodeResult> {
    if x0 >= x1 || y0 >= y1 {
        return Err(Error::InvalidInput(format!(
            "empty search region [{x0},{x1})x[{y0},{y1})"
        )));
    }
    if !(1..=40).contains(&max_version) {
        return Err(Error::InvalidInput(format!(
            "max version {max_version} outside 1..=40"
        )));
    }
    decode_impl(
        pixels,
        width,
        height,
        Some((x0, x1, y0, y1)),
        max_version,
        &NopSink,
    )
}

/// Decode an already-sampled module matrix (true = dark), skipping the
/// image pipeline entirely.
pub fn decode_matrix(matrix: &BitMatrix) -> QrResult<DecodeResult> {
    decoder::decode_matrix(matrix, &NopSink)
}

/// Bits available to segment data at a (version, EC level)
pub fn data_capacity_bits(version: u8, ec_level: ECLevel) -> QrResult<usize> {
    codec::tables::data_capacity_bits(version, ec_level)
}

/// Smallest version able to hold `len` characters of `mode` at `ec_level`
pub fn version_for_length(ec_level: ECLevel, mode: Mode, len: usize) -> QrResult<u8> {
    codec::tables::version_for_length(ec_level, mode, len)
}

fn decode_impl(
    pixels: &[u8],
    width: usize,
    height: usize,
    region: Option<(usize, usize, usize, usize)>,
    max_version: u8,
    sink: &dyn DiagnosticSink,
) -> QrResult<DecodeResult> {
    if pixels.len() != width * height * 4 {
        return Err(Error::InvalidInput(format!(
            "pixel buffer holds {} bytes, expected {}x{}x4",
            pixels.len(),
            width,
            height
        )));
    }

    let gray = rgba_to_grayscale(pixels, width, height);
    let threshold = otsu_threshold(&gray);
    let binary = binarize(&gray, width, height, threshold);

    let (x0, x1, y0, y1) = region.unwrap_or((0, width, 0, height));
    let patterns = FinderDetector::detect_in_region(&binary, x0, x1, y0, y1);
    sink.note(&DiagEvent::FinderPatterns {
        count: patterns.len(),
    });
    if patterns.len() != 3 {
        return Err(Error::FinderNotFound {
            found: patterns.len(),
        });
    }
    for p in &patterns {
        sink.note(&DiagEvent::FinderCenter {
            center: p.center,
            module_size: p.module_size,
        });
    }

    let corners = [patterns[0], patterns[1], patterns[2]];
    let (tl, tr, bl, module_size) = orient_patterns(&corners)
        .ok_or_else(|| Error::SamplingFailed("finder geometry is degenerate".into()))?;

    let sampler = Sampler::new(&binary, &gray, width, height, threshold);
    let matrix = sampler.sample_symbol(tl, tr, bl, module_size, max_version, sink)?;

    decoder::decode_matrix(&matrix, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_roundtrip_v1() {
        let symbol = encode("HELLO WORLD", Mode::Alphanumeric, ECLevel::Q, Some(1)).unwrap();
        let (pixels, w, h) = symbol.to_rgba(8, 4);
        let result = decode(&pixels, w, h).unwrap();
        assert_eq!(result.text, "HELLO WORLD");
        assert_eq!(result.version, 1);
        assert_eq!(result.ec_level, ECLevel::Q);
    }

    #[test]
    fn test_blank_image_has_no_finders() {
        let pixels = vec![255u8; 64 * 64 * 4];
        assert_eq!(
            decode(&pixels, 64, 64),
            Err(Error::FinderNotFound { found: 0 })
        );
    }

    #[test]
    fn test_buffer_size_validation() {
        assert!(matches!(
            decode(&[0u8; 33], 10, 10),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decode_region_arguments() {
        let pixels = vec![255u8; 32 * 32 * 4];
        assert!(matches!(
            decode_region(&pixels, 32, 32, 10, 10, 0, 32, 40),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decode_region(&pixels, 32, 32, 0, 32, 0, 32, 0),
            Err(Error::InvalidInput(_))
        ));
    }
}
