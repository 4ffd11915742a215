//! Encode pipeline: segment packing, version selection, Reed-Solomon
//! parity, block interleaving, layout, and mask selection.

/// Function patterns, codeword placement, masking
pub mod layout;
/// The four mask penalty rules
pub mod penalty;

use crate::codec::bitstream::BitStream;
use crate::codec::segment::{self, append_segment, finalize};
use crate::codec::tables::{self, BlockLayout};
use crate::diag::{DiagEvent, DiagnosticSink};
use crate::ec::reed_solomon::RsEncoder;
use crate::error::{Error, QrResult};
use crate::models::{ECLevel, MaskPattern, Mode, Symbol};
use layout::Layout;

/// Encode `text` into a symbol, picking the smallest version that fits
/// when none is given and the lowest-penalty mask.
pub fn encode(
    text: &str,
    mode: Mode,
    ec_level: ECLevel,
    version: Option<u8>,
    sink: &dyn DiagnosticSink,
) -> QrResult<Symbol> {
    segment::validate(text, mode)?;
    let count = segment::char_count(text, mode);

    let version = match version {
        None => tables::version_for_length(ec_level, mode, count)?,
        Some(v) => {
            if !(1..=40).contains(&v) {
                return Err(Error::InvalidInput(format!("version {v} outside 1..=40")));
            }
            let needed = 4 + mode.char_count_bits(v) + segment::payload_bits(mode, count);
            let capacity = tables::data_capacity_bits(v, ec_level)?;
            if needed > capacity {
                return Err(Error::CapacityExceeded {
                    needed_bits: needed,
                    capacity_bits: capacity,
                });
            }
            v
        }
    };

    let block_layout = tables::block_layout(version, ec_level)?;
    let capacity_bits = block_layout.data_codewords * 8;

    let mut stream = BitStream::new();
    append_segment(&mut stream, text, mode, version)?;
    finalize(&mut stream, capacity_bits);
    let data_codewords = stream.to_bytes();
    debug_assert_eq!(data_codewords.len(), block_layout.data_codewords);

    let interleaved = add_parity_and_interleave(&data_codewords, &block_layout);

    let mut symbol_layout = Layout::new(version, ec_level);
    symbol_layout.draw_codewords(&interleaved);
    let (mask, score) = choose_mask(&mut symbol_layout);
    sink.note(&DiagEvent::MaskChosen {
        mask: mask.index(),
        penalty: score,
    });

    Ok(Symbol::new(
        symbol_layout.grid().to_matrix(),
        version,
        ec_level,
        mask,
    ))
}

/// Split data into blocks, append per-block parity, then interleave
/// column-major: all data codewords first, then all parity codewords.
fn add_parity_and_interleave(data: &[u8], layout: &BlockLayout) -> Vec<u8> {
    let rs = RsEncoder::new(layout.ecc_per_block);

    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(layout.num_blocks);
    let mut offset = 0;
    for b in 0..layout.num_blocks {
        let len = layout.data_len(b);
        let block = &data[offset..offset + len];
        offset += len;
        blocks.push((block, rs.parity(block)));
    }
    debug_assert_eq!(offset, data.len());

    let long_data_len = layout.short_data_len + 1;
    let mut wire = Vec::with_capacity(layout.total_codewords);
    for i in 0..long_data_len {
        for (block_data, _) in &blocks {
            if let Some(&cw) = block_data.get(i) {
                wire.push(cw);
            }
        }
    }
    for i in 0..layout.ecc_per_block {
        for (_, parity) in &blocks {
            wire.push(parity[i]);
        }
    }
    debug_assert_eq!(wire.len(), layout.total_codewords);
    wire
}

/// Score all eight masks and keep the cheapest; ties fall to the lowest
/// index because only strictly smaller scores replace the incumbent.
fn choose_mask(symbol_layout: &mut Layout) -> (MaskPattern, i32) {
    let mut best: Option<(MaskPattern, i32)> = None;
    for index in 0..8u8 {
        let mask = MaskPattern::new(index).unwrap();
        symbol_layout.apply_mask(mask);
        symbol_layout.draw_format_bits(mask);
        let score = penalty::score(symbol_layout.grid());
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((mask, score));
        }
        symbol_layout.apply_mask(mask);
    }

    let (mask, score) = best.unwrap();
    symbol_layout.apply_mask(mask);
    symbol_layout.draw_format_bits(mask);
    (mask, score)
}
