//! Segment unpacking: the inverse of `segment`, driven by the corrected
//! data codewords.

use crate::codec::bitstream::BitStream;
use crate::codec::segment::ALPHANUMERIC_CHARSET;
use crate::error::{Error, QrResult};
use crate::models::Mode;

/// Unpack every segment until the terminator or the end of the stream.
///
/// Returns the raw payload bytes and their textual form (identical for
/// numeric/alphanumeric; lossy UTF-8 for 8-bit payloads).
pub fn decode_payload(codewords: &[u8], version: u8) -> QrResult<(Vec<u8>, String)> {
    let mut stream = BitStream::from_bytes(codewords);
    let mut data = Vec::new();
    let mut text = String::new();

    loop {
        if stream.remaining() < 4 {
            break;
        }
        let indicator = stream.read_bits(4).unwrap() as u8;
        if indicator == 0 {
            break;
        }
        let mode = Mode::from_indicator(indicator).ok_or_else(|| {
            Error::DecodingMismatch(format!("unsupported mode indicator {indicator}"))
        })?;

        let count = stream
            .read_bits(mode.char_count_bits(version))
            .ok_or_else(|| Error::DecodingMismatch("count indicator truncated".into()))? as usize;

        match mode {
            Mode::Numeric => {
                let segment = decode_numeric(&mut stream, count)?;
                data.extend_from_slice(segment.as_bytes());
                text.push_str(&segment);
            }
            Mode::Alphanumeric => {
                let segment = decode_alphanumeric(&mut stream, count)?;
                data.extend_from_slice(segment.as_bytes());
                text.push_str(&segment);
            }
            Mode::EightBit => {
                let mut bytes = Vec::with_capacity(count);
                for _ in 0..count {
                    let byte = stream.read_bits(8).ok_or_else(|| {
                        Error::DecodingMismatch("byte payload truncated".into())
                    })? as u8;
                    bytes.push(byte);
                }
                text.push_str(&String::from_utf8_lossy(&bytes));
                data.extend_from_slice(&bytes);
            }
        }
    }

    if data.is_empty() {
        return Err(Error::DecodingMismatch(
            "no segments before terminator".into(),
        ));
    }
    Ok((data, text))
}

fn decode_numeric(stream: &mut BitStream, count: usize) -> QrResult<String> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;
    while remaining > 0 {
        let group = remaining.min(3);
        let bits = [0, 4, 7, 10][group];
        let value = stream
            .read_bits(bits)
            .ok_or_else(|| Error::DecodingMismatch("numeric payload truncated".into()))?;
        if value >= [0, 10, 100, 1000][group] {
            return Err(Error::DecodingMismatch(format!(
                "numeric group value {value} out of range"
            )));
        }
        for i in (0..group).rev() {
            let digit = (value / 10u32.pow(i as u32)) % 10;
            out.push(char::from(b'0' + digit as u8));
        }
        remaining -= group;
    }
    Ok(out)
}

fn decode_alphanumeric(stream: &mut BitStream, count: usize) -> QrResult<String> {
    let mut out = String::with_capacity(count);
    let mut remaining = count;
    while remaining > 0 {
        if remaining >= 2 {
            let value = stream
                .read_bits(11)
                .ok_or_else(|| Error::DecodingMismatch("alphanumeric payload truncated".into()))?;
            let (a, b) = (value / 45, value % 45);
            if a >= 45 {
                return Err(Error::DecodingMismatch(format!(
                    "alphanumeric pair value {value} out of range"
                )));
            }
            out.push(ALPHANUMERIC_CHARSET[a as usize]);
            out.push(ALPHANUMERIC_CHARSET[b as usize]);
            remaining -= 2;
        } else {
            let value = stream
                .read_bits(6)
                .ok_or_else(|| Error::DecodingMismatch("alphanumeric payload truncated".into()))?;
            if value >= 45 {
                return Err(Error::DecodingMismatch(format!(
                    "alphanumeric value {value} out of range"
                )));
            }
            out.push(ALPHANUMERIC_CHARSET[value as usize]);
            remaining -= 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::segment::{append_segment, finalize};

    fn roundtrip(text: &str, mode: Mode, version: u8, capacity_bytes: usize) -> String {
        let mut stream = BitStream::new();
        append_segment(&mut stream, text, mode, version).unwrap();
        finalize(&mut stream, capacity_bytes * 8);
        let (_, decoded) = decode_payload(&stream.to_bytes(), version).unwrap();
        decoded
    }

    #[test]
    fn test_roundtrip_all_modes() {
        assert_eq!(roundtrip("01234567", Mode::Numeric, 1, 16), "01234567");
        assert_eq!(
            roundtrip("HELLO WORLD", Mode::Alphanumeric, 1, 13),
            "HELLO WORLD"
        );
        assert_eq!(
            roundtrip("http://qrlogo.kaarposoft.dk", Mode::EightBit, 4, 36),
            "http://qrlogo.kaarposoft.dk"
        );
    }

    #[test]
    fn test_odd_group_tails() {
        assert_eq!(roundtrip("1234567", Mode::Numeric, 1, 16), "1234567");
        assert_eq!(roundtrip("12345678", Mode::Numeric, 1, 16), "12345678");
        assert_eq!(roundtrip("AC-42", Mode::Alphanumeric, 1, 13), "AC-42");
    }

    #[test]
    fn test_unknown_mode_is_a_mismatch() {
        // Mode 0b1000 (kanji) is out of scope and must be rejected
        let mut stream = BitStream::new();
        stream.append_bits(0b1000, 4);
        stream.append_bits(0, 12);
        assert!(matches!(
            decode_payload(&stream.to_bytes(), 1),
            Err(Error::DecodingMismatch(_))
        ));
    }

    #[test]
    fn test_terminator_stops_reading() {
        let mut stream = BitStream::new();
        append_segment(&mut stream, "42", Mode::Numeric, 1).unwrap();
        finalize(&mut stream, 16 * 8);
        let (_, text) = decode_payload(&stream.to_bytes(), 1).unwrap();
        // pad bytes after the terminator must not leak into the payload
        assert_eq!(text, "42");
    }
}
