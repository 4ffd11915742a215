//! De-interleave the wire codeword stream into Reed-Solomon blocks and
//! correct each one.

use crate::codec::tables::BlockLayout;
use crate::diag::{DiagEvent, DiagnosticSink};
use crate::ec::reed_solomon::RsDecoder;
use crate::error::{Error, QrResult};

/// Undo the column-major interleave and run Reed-Solomon correction on
/// every block.
///
/// Returns the concatenated data codewords plus the error count corrected
/// in each block. Any block past capacity fails the whole symbol.
pub fn deinterleave_and_correct(
    codewords: &[u8],
    layout: &BlockLayout,
    sink: &dyn DiagnosticSink,
) -> QrResult<(Vec<u8>, Vec<usize>)> {
    if codewords.len() != layout.total_codewords {
        return Err(Error::DecodingMismatch(format!(
            "expected {} codewords, extracted {}",
            layout.total_codewords,
            codewords.len()
        )));
    }

    let mut blocks: Vec<Vec<u8>> = (0..layout.num_blocks)
        .map(|b| Vec::with_capacity(layout.data_len(b) + layout.ecc_per_block))
        .collect();

    // Data codewords, column-major over blocks of uneven length
    let long_data_len = layout.short_data_len + 1;
    let mut cursor = 0;
    for i in 0..long_data_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < layout.data_len(b) {
                block.push(codewords[cursor]);
                cursor += 1;
            }
        }
    }
    // Parity codewords, column-major over equal-length parity runs
    for _ in 0..layout.ecc_per_block {
        for block in blocks.iter_mut() {
            block.push(codewords[cursor]);
            cursor += 1;
        }
    }
    debug_assert_eq!(cursor, codewords.len());

    let rs = RsDecoder::new(layout.ecc_per_block);
    let mut data = Vec::with_capacity(layout.data_codewords);
    let mut per_block_errors = Vec::with_capacity(layout.num_blocks);
    for (b, block) in blocks.iter_mut().enumerate() {
        let errors = rs
            .correct(block)
            .ok_or(Error::Uncorrectable { block: b })?;
        if errors > 0 {
            sink.note(&DiagEvent::BlockCorrected { block: b, errors });
        }
        per_block_errors.push(errors);
        data.extend_from_slice(&block[..layout.data_len(b)]);
    }
    Ok((data, per_block_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tables::block_layout;
    use crate::diag::NopSink;
    use crate::ec::reed_solomon::RsEncoder;
    use crate::models::ECLevel;

    fn interleave(data: &[u8], layout: &BlockLayout) -> Vec<u8> {
        let rs = RsEncoder::new(layout.ecc_per_block);
        let mut blocks = Vec::new();
        let mut offset = 0;
        for b in 0..layout.num_blocks {
            let len = layout.data_len(b);
            let block = data[offset..offset + len].to_vec();
            offset += len;
            let parity = rs.parity(&block);
            blocks.push((block, parity));
        }
        let mut wire = Vec::new();
        for i in 0..layout.short_data_len + 1 {
            for (block, _) in &blocks {
                if let Some(&cw) = block.get(i) {
                    wire.push(cw);
                }
            }
        }
        for i in 0..layout.ecc_per_block {
            for (_, parity) in &blocks {
                wire.push(parity[i]);
            }
        }
        wire
    }

    #[test]
    fn test_roundtrip_uneven_blocks() {
        // V5-Q has two short and two long blocks
        let layout = block_layout(5, ECLevel::Q).unwrap();
        let data: Vec<u8> = (0..layout.data_codewords).map(|i| (i * 13 + 5) as u8).collect();
        let wire = interleave(&data, &layout);

        let (decoded, errors) = deinterleave_and_correct(&wire, &layout, &NopSink).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(errors, vec![0; 4]);
    }

    #[test]
    fn test_corrects_scattered_errors() {
        let layout = block_layout(2, ECLevel::M).unwrap();
        let data: Vec<u8> = (0..layout.data_codewords).map(|i| i as u8).collect();
        let mut wire = interleave(&data, &layout);

        // V2-M is one block with 16 parity codewords; corrupt 8 of them
        for i in 0..8 {
            wire[i * 5] ^= 0x5A;
        }
        let (decoded, errors) = deinterleave_and_correct(&wire, &layout, &NopSink).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(errors, vec![8]);
    }

    #[test]
    fn test_over_capacity_fails() {
        let layout = block_layout(2, ECLevel::M).unwrap();
        let data: Vec<u8> = vec![77; layout.data_codewords];
        let mut wire = interleave(&data, &layout);

        for i in 0..layout.total_codewords.min(20) {
            wire[i] ^= (i as u8).wrapping_mul(41) | 1;
        }
        match deinterleave_and_correct(&wire, &layout, &NopSink) {
            Err(Error::Uncorrectable { block: 0 }) => {}
            Ok((decoded, _)) => assert_eq!(decoded, data),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_wrong_length_is_a_mismatch() {
        let layout = block_layout(1, ECLevel::L).unwrap();
        assert!(matches!(
            deinterleave_and_correct(&[0u8; 10], &layout, &NopSink),
            Err(Error::DecodingMismatch(_))
        ));
    }
}
