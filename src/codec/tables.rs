//! Per-version constants from the QR Code specification (Model 2).
//!
//! The two codeword tables are reproduced verbatim from ISO/IEC 18004 and
//! must stay byte-identical; everything else here is derived from them or
//! from the closed-form formulas in the standard.

use crate::error::{Error, QrResult};
use crate::models::{ECLevel, Mode};

// Index: [ec_level][version]
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Side length in modules for a version
pub fn side_length(version: u8) -> usize {
    17 + 4 * version as usize
}

/// Inverse of `side_length`; `None` when the dimension is not a valid
/// Model 2 size
pub fn version_from_side(side: usize) -> Option<u8> {
    if !(21..=177).contains(&side) || (side - 17) % 4 != 0 {
        return None;
    }
    Some(((side - 17) / 4) as u8)
}

/// Modules available to codewords after all function patterns are placed
pub fn raw_data_modules(version: u8) -> usize {
    let v = version as usize;
    let mut result = (16 * v + 128) * v + 64;
    if v >= 2 {
        let num_align = v / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if v >= 7 {
            result -= 36;
        }
    }
    result
}

/// Total codewords in the symbol (data + ecc)
pub fn total_codewords(version: u8) -> usize {
    raw_data_modules(version) / 8
}

/// How a version/EC pair splits into Reed-Solomon blocks.
///
/// Blocks come in up to two groups whose data lengths differ by one; the
/// short group always precedes the long group on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub num_blocks: usize,
    pub ecc_per_block: usize,
    pub short_blocks: usize,
    pub short_data_len: usize,
    pub data_codewords: usize,
    pub total_codewords: usize,
}

impl BlockLayout {
    /// Data length of block `index` (short group first)
    pub fn data_len(&self, index: usize) -> usize {
        if index < self.short_blocks {
            self.short_data_len
        } else {
            self.short_data_len + 1
        }
    }

    /// Codeword errors correctable in any single block
    pub fn max_correctable(&self) -> usize {
        self.ecc_per_block / 2
    }
}

/// Block layout for a (version, EC level); `Err(InvalidInput)` outside 1..=40
pub fn block_layout(version: u8, ec_level: ECLevel) -> QrResult<BlockLayout> {
    if !(1..=40).contains(&version) {
        return Err(Error::InvalidInput(format!(
            "version {version} outside 1..=40"
        )));
    }
    let idx = ec_level.table_index();
    let ecc_per_block = ECC_CODEWORDS_PER_BLOCK[idx][version as usize] as usize;
    let num_blocks = NUM_ERROR_CORRECTION_BLOCKS[idx][version as usize] as usize;

    let total = total_codewords(version);
    let data = total - num_blocks * ecc_per_block;
    Ok(BlockLayout {
        num_blocks,
        ecc_per_block,
        short_blocks: num_blocks - data % num_blocks,
        short_data_len: data / num_blocks,
        data_codewords: data,
        total_codewords: total,
    })
}

/// Bits available to segment data (mode, count, payload, terminator, pads)
pub fn data_capacity_bits(version: u8, ec_level: ECLevel) -> QrResult<usize> {
    Ok(block_layout(version, ec_level)?.data_codewords * 8)
}

/// Alignment pattern center coordinates for a version (empty for V1).
///
/// Closed-form step from the standard; covers the irregular V32 spacing.
pub fn alignment_positions(version: u8) -> Vec<usize> {
    if version == 1 {
        return Vec::new();
    }
    let ver = version as i32;
    let size = side_length(version) as i32;
    let num_align = ver / 7 + 2;
    let step = (ver * 8 + num_align * 3 + 5) / (num_align * 4 - 4) * 2;

    let mut positions: Vec<usize> = (0..num_align - 1)
        .map(|i| (size - 7 - i * step) as usize)
        .collect();
    positions.push(6);
    positions.reverse();
    positions
}

/// Smallest version whose data capacity holds `len` characters of `mode`
/// at `ec_level`
pub fn version_for_length(ec_level: ECLevel, mode: Mode, len: usize) -> QrResult<u8> {
    let mut needed = 0;
    for version in 1..=40u8 {
        needed = 4 + mode.char_count_bits(version) + super::segment::payload_bits(mode, len);
        if needed <= data_capacity_bits(version, ec_level)? {
            return Ok(version);
        }
    }
    Err(Error::CapacityExceeded {
        needed_bits: needed,
        capacity_bits: data_capacity_bits(40, ec_level)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_codewords_fixtures() {
        // Spot values straight from the standard's capacity table
        assert_eq!(total_codewords(1), 26);
        assert_eq!(total_codewords(2), 44);
        assert_eq!(total_codewords(3), 70);
        assert_eq!(total_codewords(10), 346);
        assert_eq!(total_codewords(40), 3706);
    }

    #[test]
    fn test_block_layout_v5_q() {
        // V5-Q: 2 blocks of (33,15) + 2 blocks of (34,16)
        let layout = block_layout(5, ECLevel::Q).unwrap();
        assert_eq!(layout.num_blocks, 4);
        assert_eq!(layout.ecc_per_block, 18);
        assert_eq!(layout.short_blocks, 2);
        assert_eq!(layout.short_data_len, 15);
        assert_eq!(layout.data_codewords, 62);
    }

    #[test]
    fn test_block_totals_are_consistent() {
        for version in 1..=40u8 {
            for ec in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
                let layout = block_layout(version, ec).unwrap();
                let data_sum: usize = (0..layout.num_blocks).map(|b| layout.data_len(b)).sum();
                assert_eq!(data_sum, layout.data_codewords);
                assert_eq!(
                    data_sum + layout.num_blocks * layout.ecc_per_block,
                    layout.total_codewords,
                    "v{version} {ec:?}"
                );
            }
        }
    }

    #[test]
    fn test_alignment_positions_fixtures() {
        assert!(alignment_positions(1).is_empty());
        assert_eq!(alignment_positions(2), vec![6, 18]);
        assert_eq!(alignment_positions(7), vec![6, 22, 38]);
        assert_eq!(alignment_positions(32), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_positions(40), vec![6, 30, 58, 86, 114, 142, 170]);
    }

    #[test]
    fn test_version_for_length_monotonic() {
        for ec in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            let mut last = 1;
            for len in (1..2000).step_by(13) {
                match version_for_length(ec, Mode::EightBit, len) {
                    Ok(v) => {
                        assert!(v >= last, "len {len} shrank version");
                        last = v;
                    }
                    Err(_) => break,
                }
            }
        }
    }

    #[test]
    fn test_version_from_side() {
        assert_eq!(version_from_side(21), Some(1));
        assert_eq!(version_from_side(177), Some(40));
        assert_eq!(version_from_side(22), None);
        assert_eq!(version_from_side(17), None);
    }
}
