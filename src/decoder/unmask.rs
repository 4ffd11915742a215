use crate::decoder::function_mask::FunctionMask;
use crate::models::{BitMatrix, MaskPattern};

/// Remove the data mask by XORing the pattern over every data cell.
pub fn unmask(matrix: &mut BitMatrix, mask: MaskPattern, func: &FunctionMask) {
    let size = func.size();
    for y in 0..size {
        for x in 0..size {
            if !func.is_function(x, y) && mask.is_masked(y, x) {
                matrix.toggle(x, y);
            }
        }
    }
}
