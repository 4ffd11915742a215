//! Decode pipeline from a sampled module matrix back to text
//!
//! - Function module map shared with the encoder
//! - Format/version info extraction with BCH matching
//! - Unmasking, zig-zag extraction, de-interleaving, Reed-Solomon
//! - Payload unpacking and quality grading

/// De-interleaving and per-block Reed-Solomon correction
pub mod blocks;
/// Codeword extraction along the placement traversal
pub mod extract;
/// Format info (EC level + mask) extraction
pub mod format;
/// Function module map and data traversal order
pub mod function_mask;
/// Mask removal
pub mod unmask;
/// Version info extraction for V7+
pub mod version_info;

use crate::codec::{tables, text};
use crate::diag::DiagnosticSink;
use crate::error::{Error, QrResult};
use crate::grading;
use crate::models::{BitMatrix, DecodeResult};
use function_mask::FunctionMask;

/// Decode a sampled module matrix (true = dark).
///
/// The matrix dimension fixes the version; the version-info field, when
/// present and readable, only cross-checks it. Format info, unmasking,
/// extraction, Reed-Solomon and payload unpacking follow in order, and
/// the advisory grades are computed on the way out.
pub fn decode_matrix(matrix: &BitMatrix, sink: &dyn DiagnosticSink) -> QrResult<DecodeResult> {
    if matrix.width() != matrix.height() {
        return Err(Error::InvalidInput(format!(
            "matrix is {}x{}, not square",
            matrix.width(),
            matrix.height()
        )));
    }
    let version = tables::version_from_side(matrix.width()).ok_or_else(|| {
        Error::InvalidInput(format!("{} modules is not a QR dimension", matrix.width()))
    })?;

    let (ec_level, mask) = format::read_format(matrix, sink)?;

    let func = FunctionMask::new(version);
    let mut unmasked = matrix.clone();
    unmask::unmask(&mut unmasked, mask, &func);
    let codewords = extract::extract_codewords(&unmasked, &func);

    let layout = tables::block_layout(version, ec_level)?;
    let (data_codewords, per_block_errors) =
        blocks::deinterleave_and_correct(&codewords, &layout, sink)?;

    let (data, decoded_text) = text::decode_payload(&data_codewords, version)?;

    Ok(DecodeResult {
        text: decoded_text,
        data,
        version,
        ec_level,
        mask,
        functional_grade: grading::functional_grade(matrix, version),
        error_grade: grading::error_grade(&per_block_errors, layout.max_correctable()),
        per_block_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NopSink;
    use crate::encoder;
    use crate::models::{ECLevel, Mode};

    #[test]
    fn test_matrix_roundtrip() {
        let symbol = encoder::encode(
            "HELLO WORLD",
            Mode::Alphanumeric,
            ECLevel::Q,
            Some(1),
            &NopSink,
        )
        .unwrap();
        let result = decode_matrix(symbol.matrix(), &NopSink).unwrap();
        assert_eq!(result.text, "HELLO WORLD");
        assert_eq!(result.version, 1);
        assert_eq!(result.ec_level, ECLevel::Q);
        assert_eq!(result.mask, symbol.mask());
        assert_eq!(result.functional_grade, 4);
        assert_eq!(result.error_grade, 4);
        assert_eq!(result.per_block_errors, vec![0]);
    }

    #[test]
    fn test_rejects_bad_dimension() {
        assert!(matches!(
            decode_matrix(&BitMatrix::new(20, 20), &NopSink),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decode_matrix(&BitMatrix::new(21, 25), &NopSink),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_flipped_data_modules_are_corrected() {
        let symbol = encoder::encode(
            "http://qrlogo.kaarposoft.dk",
            Mode::EightBit,
            ECLevel::H,
            None,
            &NopSink,
        )
        .unwrap();
        let mut matrix = symbol.matrix().clone();
        let n = matrix.width();
        // a 3x3 hole in the lower-right data region
        for y in n - 12..n - 9 {
            for x in n - 12..n - 9 {
                matrix.toggle(x, y);
            }
        }
        let result = decode_matrix(&matrix, &NopSink).unwrap();
        assert_eq!(result.text, "http://qrlogo.kaarposoft.dk");
        assert!(result.per_block_errors.iter().any(|&e| e > 0));
        assert!(result.error_grade < 4);
    }
}
