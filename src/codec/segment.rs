//! Segment packing: mode indicator, character count, payload, terminator
//! and pad bytes.

use crate::codec::bitstream::BitStream;
use crate::error::{Error, QrResult};
use crate::models::Mode;

/// The 45-character alphanumeric set, in value order 0..=44
pub static ALPHANUMERIC_CHARSET: [char; 45] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', ' ', '$',
    '%', '*', '+', '-', '.', '/', ':',
];

/// Value of `c` in the alphanumeric set, if it belongs to it
pub fn alphanumeric_index(c: char) -> Option<u8> {
    ALPHANUMERIC_CHARSET
        .iter()
        .position(|&a| a == c)
        .map(|i| i as u8)
}

/// Character count as the count indicator sees it (bytes for 8-bit mode)
pub fn char_count(text: &str, mode: Mode) -> usize {
    match mode {
        Mode::Numeric | Mode::Alphanumeric => text.chars().count(),
        Mode::EightBit => text.len(),
    }
}

/// Reject text the chosen mode cannot carry
pub fn validate(text: &str, mode: Mode) -> QrResult<()> {
    if text.is_empty() {
        return Err(Error::InvalidInput("empty payload".into()));
    }
    match mode {
        Mode::Numeric => {
            if let Some(c) = text.chars().find(|c| !c.is_ascii_digit()) {
                return Err(Error::InvalidInput(format!(
                    "{c:?} is not a decimal digit"
                )));
            }
        }
        Mode::Alphanumeric => {
            if let Some(c) = text.chars().find(|&c| alphanumeric_index(c).is_none()) {
                return Err(Error::InvalidInput(format!(
                    "{c:?} is not in the alphanumeric set"
                )));
            }
        }
        Mode::EightBit => {}
    }
    Ok(())
}

/// Payload size in bits for `len` characters of `mode`, excluding the mode
/// and count indicators
pub fn payload_bits(mode: Mode, len: usize) -> usize {
    match mode {
        Mode::Numeric => 10 * (len / 3) + [0, 4, 7][len % 3],
        Mode::Alphanumeric => 11 * (len / 2) + 6 * (len % 2),
        Mode::EightBit => 8 * len,
    }
}

/// Append one validated segment: mode indicator, count indicator, payload
pub fn append_segment(
    stream: &mut BitStream,
    text: &str,
    mode: Mode,
    version: u8,
) -> QrResult<()> {
    validate(text, mode)?;

    stream.append_bits(u32::from(mode.indicator()), 4);
    let count = char_count(text, mode);
    let count_bits = mode.char_count_bits(version);
    debug_assert!(count < 1 << count_bits, "count indicator overflow");
    stream.append_bits(count as u32, count_bits);

    match mode {
        Mode::Numeric => {
            let digits: Vec<u32> = text.chars().map(|c| c as u32 - '0' as u32).collect();
            for group in digits.chunks(3) {
                let value = group.iter().fold(0, |acc, &d| acc * 10 + d);
                stream.append_bits(value, [0, 4, 7, 10][group.len()]);
            }
        }
        Mode::Alphanumeric => {
            let values: Vec<u32> = text
                .chars()
                .map(|c| u32::from(alphanumeric_index(c).unwrap()))
                .collect();
            for pair in values.chunks(2) {
                match pair {
                    [a, b] => stream.append_bits(45 * a + b, 11),
                    [a] => stream.append_bits(*a, 6),
                    _ => unreachable!(),
                }
            }
        }
        Mode::EightBit => {
            for &byte in text.as_bytes() {
                stream.append_bits(u32::from(byte), 8);
            }
        }
    }
    Ok(())
}

/// Terminator (truncated at capacity), zero-pad to a byte boundary, then
/// alternate 0xEC / 0x11 pad codewords up to the data capacity
pub fn finalize(stream: &mut BitStream, capacity_bits: usize) {
    debug_assert!(stream.len() <= capacity_bits);

    let terminator = 4.min(capacity_bits - stream.len());
    stream.append_bits(0, terminator);
    stream.append_bits(0, (8 - stream.len() % 8) % 8);

    let mut pad = 0xEC;
    while stream.len() < capacity_bits {
        stream.append_bits(pad, 8);
        pad ^= 0xEC ^ 0x11;
    }
}
