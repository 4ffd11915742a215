//! Version info extraction for V7+ symbols: two 18-bit copies matched
//! against the BCH(18,6) codewords for versions 7..=40.

use crate::ec::bch;
use crate::models::BitMatrix;

/// Read and match the version field from both standard locations.
///
/// Returns the version whose codeword sits closest (within 3 bit errors)
/// to either reading; `None` when both copies are beyond repair.
pub fn read_version(matrix: &BitMatrix) -> Option<u8> {
    let size = matrix.width();
    if size < 45 {
        return None;
    }

    let mut top_right = 0u32;
    let mut bottom_left = 0u32;
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        top_right |= u32::from(matrix.get(a, b)) << i;
        bottom_left |= u32::from(matrix.get(b, a)) << i;
    }

    let mut best: Option<(u8, u32)> = None;
    for raw in [top_right, bottom_left] {
        if let Some((version, distance)) = bch::match_version(raw) {
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((version, distance));
            }
        }
    }
    best.map(|(version, _)| version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::layout::Layout;
    use crate::models::ECLevel;

    #[test]
    fn test_reads_what_the_encoder_wrote() {
        for version in [7u8, 10, 21, 33, 40] {
            let layout = Layout::new(version, ECLevel::M);
            let matrix = layout.grid().to_matrix();
            assert_eq!(read_version(&matrix), Some(version));
        }
    }

    #[test]
    fn test_small_symbols_have_no_version_field() {
        let layout = Layout::new(6, ECLevel::M);
        assert_eq!(read_version(&layout.grid().to_matrix()), None);
    }

    #[test]
    fn test_tolerates_three_errors_per_copy() {
        let layout = Layout::new(12, ECLevel::L);
        let mut matrix = layout.grid().to_matrix();
        let size = matrix.width();
        // flip three scattered bits in each copy
        for i in [0usize, 7, 16] {
            matrix.toggle(size - 11 + i % 3, i / 3);
            matrix.toggle(i / 3, size - 11 + i % 3);
        }
        assert_eq!(read_version(&matrix), Some(12));
    }
}
