//! Codeword extraction: walk the zig-zag traversal over an unmasked
//! matrix and pack the data-cell bits back into codewords.

use crate::decoder::function_mask::{FunctionMask, data_module_order};
use crate::models::BitMatrix;

/// Read every data cell in placement order and pack MSB-first into
/// codewords. Remainder bits past the last full codeword are dropped.
pub fn extract_codewords(matrix: &BitMatrix, func: &FunctionMask) -> Vec<u8> {
    let order = data_module_order(func);
    let mut codewords = Vec::with_capacity(order.len() / 8);

    let mut byte = 0u8;
    let mut filled = 0;
    for &(x, y) in &order {
        byte = byte << 1 | u8::from(matrix.get(x, y));
        filled += 1;
        if filled == 8 {
            codewords.push(byte);
            byte = 0;
            filled = 0;
        }
    }
    codewords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tables::total_codewords;
    use crate::encoder::layout::Layout;
    use crate::models::ECLevel;

    #[test]
    fn test_extract_inverts_draw() {
        for version in [1u8, 3, 7, 11] {
            let total = total_codewords(version);
            let codewords: Vec<u8> = (0..total).map(|i| (i * 29 + 7) as u8).collect();

            let mut layout = Layout::new(version, ECLevel::L);
            layout.draw_codewords(&codewords);
            let matrix = layout.grid().to_matrix();

            let func = FunctionMask::new(version);
            assert_eq!(extract_codewords(&matrix, &func), codewords);
        }
    }
}
