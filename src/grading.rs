//! Advisory symbol quality grades.
//!
//! Grades never gate decoding; they tell the caller how much margin the
//! symbol had left.

use crate::codec::tables::{alignment_positions, side_length};
use crate::models::BitMatrix;

/// Grade how cleanly the function patterns came through sampling: 4 when
/// every finder/timing/alignment module agrees with the ideal pattern,
/// stepping down as the worst-region disagreement grows.
pub fn functional_grade(matrix: &BitMatrix, version: u8) -> u8 {
    let size = side_length(version);
    if matrix.width() != size || matrix.height() != size {
        return 0;
    }

    let mut worst = 0.0f32;

    for &(cx, cy) in &[(3, 3), (size - 4, 3), (3, size - 4)] {
        worst = worst.max(finder_mismatch(matrix, cx, cy));
    }
    worst = worst.max(timing_mismatch(matrix, size));
    let centers = alignment_positions(version);
    for &cy in &centers {
        for &cx in &centers {
            let in_tl = cx <= 8 && cy <= 8;
            let in_tr = cx >= size - 9 && cy <= 8;
            let in_bl = cx <= 8 && cy >= size - 9;
            if in_tl || in_tr || in_bl {
                continue;
            }
            worst = worst.max(alignment_mismatch(matrix, cx, cy));
        }
    }

    match worst {
        w if w <= 0.05 => 4,
        w if w <= 0.10 => 3,
        w if w <= 0.20 => 2,
        w if w <= 0.35 => 1,
        _ => 0,
    }
}

/// Grade the Reed-Solomon margin: 4 with no errors corrected, 0 when the
/// worst block consumed the whole correction budget.
pub fn error_grade(per_block_errors: &[usize], max_correctable: usize) -> u8 {
    let worst = per_block_errors.iter().copied().max().unwrap_or(0);
    if max_correctable == 0 {
        return if worst == 0 { 4 } else { 0 };
    }
    (4usize.saturating_sub(worst * 4 / max_correctable)) as u8
}

fn finder_mismatch(matrix: &BitMatrix, cx: usize, cy: usize) -> f32 {
    let mut mismatches = 0;
    for dy in -3i32..=3 {
        for dx in -3i32..=3 {
            let ring = dx.abs().max(dy.abs());
            let ideal = ring != 2;
            let x = (cx as i32 + dx) as usize;
            let y = (cy as i32 + dy) as usize;
            if matrix.get(x, y) != ideal {
                mismatches += 1;
            }
        }
    }
    mismatches as f32 / 49.0
}

fn timing_mismatch(matrix: &BitMatrix, size: usize) -> f32 {
    let mut mismatches = 0;
    let mut cells = 0;
    for i in 8..size - 8 {
        cells += 2;
        if matrix.get(i, 6) != (i % 2 == 0) {
            mismatches += 1;
        }
        if matrix.get(6, i) != (i % 2 == 0) {
            mismatches += 1;
        }
    }
    if cells == 0 {
        return 0.0;
    }
    mismatches as f32 / cells as f32
}

fn alignment_mismatch(matrix: &BitMatrix, cx: usize, cy: usize) -> f32 {
    let mut mismatches = 0;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let ideal = dx.abs().max(dy.abs()) != 1;
            let x = (cx as i32 + dx) as usize;
            let y = (cy as i32 + dy) as usize;
            if matrix.get(x, y) != ideal {
                mismatches += 1;
            }
        }
    }
    mismatches as f32 / 25.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::layout::Layout;
    use crate::models::ECLevel;

    #[test]
    fn test_clean_symbol_grades_four() {
        for version in [1u8, 2, 7] {
            let layout = Layout::new(version, ECLevel::M);
            let matrix = layout.grid().to_matrix();
            assert_eq!(functional_grade(&matrix, version), 4);
        }
    }

    #[test]
    fn test_damaged_finder_lowers_grade() {
        let layout = Layout::new(1, ECLevel::M);
        let mut matrix = layout.grid().to_matrix();
        for x in 0..5 {
            for y in 0..5 {
                matrix.toggle(x, y);
            }
        }
        assert!(functional_grade(&matrix, 1) < 4);
    }

    #[test]
    fn test_wrong_dimension_grades_zero() {
        let matrix = BitMatrix::new(25, 25);
        assert_eq!(functional_grade(&matrix, 1), 0);
    }

    #[test]
    fn test_error_grade_scale() {
        assert_eq!(error_grade(&[0, 0], 8), 4);
        assert_eq!(error_grade(&[2, 0], 8), 3);
        assert_eq!(error_grade(&[4, 1], 8), 2);
        assert_eq!(error_grade(&[8, 0], 8), 0);
        assert_eq!(error_grade(&[], 8), 4);
    }
}
