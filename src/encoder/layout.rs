//! Symbol layout: function patterns, codeword placement, masking, and the
//! BCH-protected metadata fields.

use crate::codec::tables::{alignment_positions, side_length};
use crate::decoder::function_mask::{FunctionMask, data_module_order};
use crate::ec::bch;
use crate::models::{ECLevel, Grid, MaskPattern};

/// Mutable symbol under construction.
pub struct Layout {
    grid: Grid,
    func: FunctionMask,
    version: u8,
    ec_level: ECLevel,
}

impl Layout {
    /// Start a layout with every function pattern drawn and a placeholder
    /// format field reserved
    pub fn new(version: u8, ec_level: ECLevel) -> Self {
        let mut layout = Self {
            grid: Grid::new(side_length(version)),
            func: FunctionMask::new(version),
            version,
            ec_level,
        };
        layout.draw_function_patterns();
        layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn size(&self) -> usize {
        self.grid.size()
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size();

        // Timing patterns first; finders and alignment overwrite their ends
        for i in 0..size {
            self.grid.set_function(i, 6, i % 2 == 0);
            self.grid.set_function(6, i, i % 2 == 0);
        }

        self.draw_finder(3, 3);
        self.draw_finder(size - 4, 3);
        self.draw_finder(3, size - 4);

        let centers = alignment_positions(self.version);
        for &cy in &centers {
            for &cx in &centers {
                let in_tl = cx <= 8 && cy <= 8;
                let in_tr = cx >= size - 9 && cy <= 8;
                let in_bl = cx <= 8 && cy >= size - 9;
                if in_tl || in_tr || in_bl {
                    continue;
                }
                self.draw_alignment(cx, cy);
            }
        }

        // Reserve format cells (mask 0 placeholder; rewritten per candidate)
        self.draw_format_bits(MaskPattern::new(0).unwrap());
        self.draw_version_info();
    }

    fn draw_finder(&mut self, cx: usize, cy: usize) {
        let size = self.size() as i32;
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let x = cx as i32 + dx;
                let y = cy as i32 + dy;
                if !(0..size).contains(&x) || !(0..size).contains(&y) {
                    continue;
                }
                let ring = dx.abs().max(dy.abs());
                self.grid
                    .set_function(x as usize, y as usize, ring != 2 && ring != 4);
            }
        }
    }

    fn draw_alignment(&mut self, cx: usize, cy: usize) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let dark = dx.abs().max(dy.abs()) != 1;
                self.grid
                    .set_function((cx as i32 + dx) as usize, (cy as i32 + dy) as usize, dark);
            }
        }
    }

    /// Write the 15 format bits at both standard copies plus the dark module
    pub fn draw_format_bits(&mut self, mask: MaskPattern) {
        let bits = bch::format_info(self.ec_level, mask);
        let size = self.size();
        let bit = |i: usize| bits >> i & 1 == 1;

        // First copy, wrapped around the top-left finder
        for i in 0..6 {
            self.grid.set_function(8, i, bit(i));
        }
        self.grid.set_function(8, 7, bit(6));
        self.grid.set_function(8, 8, bit(7));
        self.grid.set_function(7, 8, bit(8));
        for i in 9..15 {
            self.grid.set_function(14 - i, 8, bit(i));
        }

        // Second copy, split across the other two finders
        for i in 0..8 {
            self.grid.set_function(size - 1 - i, 8, bit(i));
        }
        for i in 8..15 {
            self.grid.set_function(8, size - 15 + i, bit(i));
        }
        self.grid.set_function(8, size - 8, true);
    }

    fn draw_version_info(&mut self) {
        if self.version < 7 {
            return;
        }
        let bits = bch::version_info(self.version);
        let size = self.size();
        for i in 0..18 {
            let dark = bits >> i & 1 == 1;
            let a = size - 11 + i % 3;
            let b = i / 3;
            self.grid.set_function(a, b, dark);
            self.grid.set_function(b, a, dark);
        }
    }

    /// Stream the interleaved codewords along the zig-zag traversal.
    ///
    /// Remainder cells past the last codeword stay light (they pick up
    /// color from masking only).
    pub fn draw_codewords(&mut self, codewords: &[u8]) {
        let order = data_module_order(&self.func);
        debug_assert!(codewords.len() * 8 <= order.len());

        for (i, &(x, y)) in order.iter().enumerate() {
            let dark = if i < codewords.len() * 8 {
                codewords[i / 8] >> (7 - i % 8) & 1 == 1
            } else {
                false
            };
            self.grid.set_data(x, y, dark);
        }
    }

    /// XOR the mask over the data region. Self-inverse: applying the same
    /// pattern twice restores the grid.
    pub fn apply_mask(&mut self, mask: MaskPattern) {
        let size = self.size();
        for y in 0..size {
            for x in 0..size {
                if !self.func.is_function(x, y) && mask.is_masked(y, x) {
                    self.grid.toggle_data(x, y);
                }
            }
        }
    }
}
