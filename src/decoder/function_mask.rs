use crate::codec::tables::{alignment_positions, side_length};
use crate::models::BitMatrix;

/// Function module map for a QR version: true = function cell (finders,
/// separators, timing, alignment, format/version info, dark module),
/// false = data cell.
///
/// Both directions consult this one map, so the encoder's bit placement
/// and the decoder's bit extraction can never disagree about which cells
/// carry data.
pub struct FunctionMask {
    mask: BitMatrix,
    version: u8,
}

impl FunctionMask {
    pub fn new(version: u8) -> Self {
        let size = side_length(version);
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators: 8x8 corner areas
        Self::mark_rect(&mut mask, 0, 0, 8, 8);
        Self::mark_rect(&mut mask, size - 8, 0, 8, 8);
        Self::mark_rect(&mut mask, 0, size - 8, 8, 8);

        // Timing row and column; the stretches inside the finder areas are
        // already covered, the rest is timing proper
        for i in 0..size {
            mask.set(i, 6, true);
            mask.set(6, i, true);
        }

        // Alignment patterns, skipping the three finder corners
        let centers = alignment_positions(version);
        for &cy in &centers {
            for &cx in &centers {
                let in_tl = cx <= 8 && cy <= 8;
                let in_tr = cx >= size - 9 && cy <= 8;
                let in_bl = cx <= 8 && cy >= size - 9;
                if in_tl || in_tr || in_bl {
                    continue;
                }
                Self::mark_rect(&mut mask, cx - 2, cy - 2, 5, 5);
            }
        }

        // Format info: first copy around the top-left finder, second copy
        // split under the top-right and beside the bottom-left finders
        for i in 0..9 {
            mask.set(8, i, true);
            mask.set(i, 8, true);
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        // Version info blocks for V7+: 3x6 below-left of the top-right
        // finder, mirrored 6x3 above the bottom-left finder
        if version >= 7 {
            for dy in 0..6 {
                for dx in 0..3 {
                    mask.set(size - 11 + dx, dy, true);
                    mask.set(dy, size - 11 + dx, true);
                }
            }
        }

        Self { mask, version }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Whether (x, y) is a function cell
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Number of cells available to codeword bits
    pub fn data_module_count(&self) -> usize {
        self.size() * self.size() - self.mask.count_dark()
    }

    fn mark_rect(mask: &mut BitMatrix, x: usize, y: usize, w: usize, h: usize) {
        for yy in y..y + h {
            for xx in x..x + w {
                mask.set(xx, yy, true);
            }
        }
    }
}

/// Data-cell coordinates in codeword placement order.
///
/// Column pairs are walked right to left (skipping the timing column 6),
/// alternating upward and downward, visiting the right cell of each pair
/// before the left one and stepping over function cells.
pub fn data_module_order(func: &FunctionMask) -> Vec<(usize, usize)> {
    let size = func.size();
    let mut order = Vec::with_capacity(func.data_module_count());

    let mut right = size as i32 - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let upward = (right + 1) & 2 == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let x = (right - j) as usize;
                if !func.is_function(x, y) {
                    order.push((x, y));
                }
            }
        }
        right -= 2;
    }
    order
}
