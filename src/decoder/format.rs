//! Format info extraction: two 15-bit copies, each matched against the 32
//! valid BCH(15,5) codewords.

use crate::diag::{DiagEvent, DiagnosticSink};
use crate::ec::bch;
use crate::error::{Error, QrResult};
use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// Read and BCH-match the format field from both standard locations.
///
/// A single unreadable copy is tolerated. When both match, the closer one
/// wins; at equal distance the top-left copy is authoritative.
pub fn read_format(
    matrix: &BitMatrix,
    sink: &dyn DiagnosticSink,
) -> QrResult<(ECLevel, MaskPattern)> {
    let copies = [read_copy_top_left(matrix), read_copy_split(matrix)];

    let mut best: Option<(ECLevel, MaskPattern, u32)> = None;
    for (location, &raw) in copies.iter().enumerate() {
        match bch::match_format(raw) {
            Some((ec_level, mask, distance)) => {
                if best.is_none_or(|(_, _, d)| distance < d) {
                    best = Some((ec_level, mask, distance));
                }
            }
            None => sink.warn(&DiagEvent::FormatCopyFailed { location }),
        }
    }

    best.map(|(ec_level, mask, _)| (ec_level, mask))
        .ok_or(Error::FormatInfoUnreadable)
}

/// First copy, wrapped around the top-left finder. Bit i of the return
/// value is the module where the encoder placed bit i.
fn read_copy_top_left(matrix: &BitMatrix) -> u16 {
    let mut raw = 0u16;
    for i in 0..6 {
        raw |= u16::from(matrix.get(8, i)) << i;
    }
    raw |= u16::from(matrix.get(8, 7)) << 6;
    raw |= u16::from(matrix.get(8, 8)) << 7;
    raw |= u16::from(matrix.get(7, 8)) << 8;
    for i in 9..15 {
        raw |= u16::from(matrix.get(14 - i, 8)) << i;
    }
    raw
}

/// Second copy, split across the top-right and bottom-left finders.
fn read_copy_split(matrix: &BitMatrix) -> u16 {
    let size = matrix.width();
    let mut raw = 0u16;
    for i in 0..8 {
        raw |= u16::from(matrix.get(size - 1 - i, 8)) << i;
    }
    for i in 8..15 {
        raw |= u16::from(matrix.get(8, size - 15 + i)) << i;
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NopSink;
    use crate::encoder::layout::Layout;

    fn drawn_matrix(ec_level: ECLevel, mask: MaskPattern) -> BitMatrix {
        let mut layout = Layout::new(2, ec_level);
        layout.draw_format_bits(mask);
        layout.grid().to_matrix()
    }

    #[test]
    fn test_reads_what_the_encoder_wrote() {
        for ec_level in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            for index in 0..8u8 {
                let mask = MaskPattern::new(index).unwrap();
                let matrix = drawn_matrix(ec_level, mask);
                assert_eq!(
                    read_format(&matrix, &NopSink).unwrap(),
                    (ec_level, mask),
                    "ec {ec_level:?} mask {index}"
                );
            }
        }
    }

    #[test]
    fn test_survives_one_obliterated_copy() {
        let mask = MaskPattern::new(4).unwrap();
        let mut matrix = drawn_matrix(ECLevel::Q, mask);
        // trash the split copy with an alternating pattern
        let size = matrix.width();
        for i in 0..8 {
            matrix.set(size - 1 - i, 8, i % 2 == 0);
        }
        for i in 8..15 {
            matrix.set(8, size - 15 + i, i % 3 == 0);
        }
        assert_eq!(read_format(&matrix, &NopSink).unwrap(), (ECLevel::Q, mask));
    }

    #[test]
    fn test_both_copies_gone_is_unreadable() {
        // find a reading at distance >= 4 from every valid codeword
        let bad_raw = (0..1u16 << 15)
            .find(|&raw| crate::ec::bch::match_format(raw).is_none())
            .unwrap();

        let mut matrix = drawn_matrix(ECLevel::L, MaskPattern::new(0).unwrap());
        let size = matrix.width();
        for i in 0..6 {
            matrix.set(8, i, bad_raw >> i & 1 == 1);
        }
        matrix.set(8, 7, bad_raw >> 6 & 1 == 1);
        matrix.set(8, 8, bad_raw >> 7 & 1 == 1);
        matrix.set(7, 8, bad_raw >> 8 & 1 == 1);
        for i in 9..15 {
            matrix.set(14 - i, 8, bad_raw >> i & 1 == 1);
        }
        for i in 0..8 {
            matrix.set(size - 1 - i, 8, bad_raw >> i & 1 == 1);
        }
        for i in 8..15 {
            matrix.set(8, size - 15 + i, bad_raw >> i & 1 == 1);
        }
        assert_eq!(
            read_format(&matrix, &NopSink),
            Err(Error::FormatInfoUnreadable)
        );
    }
}
