//! Reed-Solomon codec over GF(256) for QR codewords.
//!
//! Encoding computes parity as the remainder of data(x) * x^ecc modulo the
//! generator polynomial g(x) = prod (x - alpha^i). Decoding follows the
//! classic pipeline: syndromes, extended-Euclidean key equation, Chien
//! search, Forney magnitudes, then a full re-verification pass.

use crate::ec::gf256::{self, Gf256};

/// Parity generator for one block size
pub struct RsEncoder {
    generator: Vec<u8>,
    ecc_len: usize,
}

impl RsEncoder {
    /// Build the degree-`ecc_len` generator polynomial
    pub fn new(ecc_len: usize) -> Self {
        debug_assert!((1..=255).contains(&ecc_len));
        let mut generator = vec![1u8];
        for i in 0..ecc_len {
            // g *= (x - alpha^i); subtraction is addition in GF(2^8)
            generator = gf256::mul(&generator, &[Gf256::exp(i), 1]);
        }
        Self { generator, ecc_len }
    }

    /// Parity codewords for a data block, in wire order (appended after
    /// the data they protect)
    pub fn parity(&self, data: &[u8]) -> Vec<u8> {
        // data[0] carries the highest power of x; shift up by x^ecc
        let mut shifted = vec![0u8; data.len() + self.ecc_len];
        for (i, &byte) in data.iter().enumerate() {
            shifted[data.len() + self.ecc_len - 1 - i] = byte;
        }
        let (_, rem) = gf256::divmod(&shifted, &self.generator);

        let mut parity = vec![0u8; self.ecc_len];
        for (deg, &coeff) in rem.iter().enumerate() {
            parity[self.ecc_len - 1 - deg] = coeff;
        }
        parity
    }
}

/// Error corrector for one block size
pub struct RsDecoder {
    ecc_len: usize,
}

impl RsDecoder {
    pub fn new(ecc_len: usize) -> Self {
        Self { ecc_len }
    }

    /// Correct `codeword` (data followed by parity) in place.
    ///
    /// Returns the number of corrected codeword errors, or `None` when the
    /// block is beyond correction capacity. A `None` leaves the buffer in
    /// an unspecified state; callers must treat the block as lost.
    pub fn correct(&self, codeword: &mut [u8]) -> Option<usize> {
        let syndromes = self.syndromes(codeword);
        if syndromes.iter().all(|&s| s == 0) {
            return Some(0);
        }

        let (sigma, omega) = self.solve_key_equation(&syndromes)?;
        let nu = gf256::degree(&sigma);
        if nu <= 0 || nu as usize > self.ecc_len / 2 {
            return None;
        }
        let nu = nu as usize;

        // Chien search: index j holds the coefficient of x^(n-1-j), so the
        // locator root test at position p = n-1-j uses alpha^-p.
        let n = codeword.len();
        let mut error_indexes = Vec::with_capacity(nu);
        for j in 0..n {
            let p = n - 1 - j;
            let x_inv = Gf256::exp((255 - p % 255) % 255);
            if gf256::eval(&sigma, x_inv) == 0 {
                error_indexes.push(j);
            }
        }
        if error_indexes.len() != nu {
            return None;
        }

        // Formal derivative keeps only the odd-degree terms in GF(2^m)
        let mut sigma_deriv = vec![0u8; sigma.len().saturating_sub(1).max(1)];
        for (deg, &coeff) in sigma.iter().enumerate() {
            if deg % 2 == 1 {
                sigma_deriv[deg - 1] = coeff;
            }
        }

        for &j in &error_indexes {
            let p = n - 1 - j;
            let x = Gf256::exp(p % 255);
            let x_inv = Gf256::exp((255 - p % 255) % 255);
            let denom = gf256::eval(&sigma_deriv, x_inv);
            if denom == 0 {
                return None;
            }
            // Forney with b = 0: e = X * omega(X^-1) / sigma'(X^-1)
            let magnitude = Gf256::mul(x, Gf256::div(gf256::eval(&omega, x_inv), denom));
            codeword[j] ^= magnitude;
        }

        let check = self.syndromes(codeword);
        if check.iter().any(|&s| s != 0) {
            return None;
        }
        Some(nu)
    }

    /// S_i = r(alpha^i) for i in 0..ecc_len
    fn syndromes(&self, codeword: &[u8]) -> Vec<u8> {
        (0..self.ecc_len)
            .map(|i| {
                let x = Gf256::exp(i);
                codeword
                    .iter()
                    .fold(0u8, |acc, &byte| Gf256::mul(acc, x) ^ byte)
            })
            .collect()
    }

    /// Extended Euclid on (x^ecc, S(x)), stopping when deg(remainder)
    /// drops below ecc/2. Returns (sigma, omega) normalized to sigma(0)=1.
    fn solve_key_equation(&self, syndromes: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        let t = (self.ecc_len / 2) as isize;

        let mut r_prev = vec![0u8; self.ecc_len + 1];
        r_prev[self.ecc_len] = 1;
        let mut r_cur = syndromes.to_vec();
        gf256::trim(&mut r_cur);

        let mut t_prev = vec![0u8];
        let mut t_cur = vec![1u8];

        while gf256::degree(&r_cur) >= t {
            let (q, rem) = gf256::divmod(&r_prev, &r_cur);
            let t_next = gf256::add(&t_prev, &gf256::mul(&q, &t_cur));
            r_prev = std::mem::replace(&mut r_cur, rem);
            t_prev = std::mem::replace(&mut t_cur, t_next);
            if gf256::degree(&r_cur) < 0 {
                break;
            }
        }

        let lead = *t_cur.first()?;
        if lead == 0 {
            return None;
        }
        let inv = Gf256::inv(lead);
        Some((gf256::scale(&t_cur, inv), gf256::scale(&r_cur, inv)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_block(data: &[u8], ecc_len: usize) -> Vec<u8> {
        let mut block = data.to_vec();
        block.extend(RsEncoder::new(ecc_len).parity(data));
        block
    }

    #[test]
    fn test_clean_block_has_zero_syndromes() {
        let block = encode_block(&[32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17], 10);
        let decoder = RsDecoder::new(10);
        assert_eq!(decoder.syndromes(&block), vec![0u8; 10]);
        let mut copy = block.clone();
        assert_eq!(decoder.correct(&mut copy), Some(0));
        assert_eq!(copy, block);
    }

    #[test]
    fn test_corrects_up_to_capacity() {
        let data = [64, 86, 22, 198, 6, 54, 199, 166, 16, 236, 17, 236, 17, 236, 17, 236];
        let clean = encode_block(&data, 10);
        let decoder = RsDecoder::new(10);

        for errors in 1..=5usize {
            let mut corrupted = clean.clone();
            for e in 0..errors {
                corrupted[e * 3] ^= 0xA5u8.rotate_left(e as u32);
            }
            assert_eq!(decoder.correct(&mut corrupted), Some(errors));
            assert_eq!(corrupted, clean);
        }
    }

    #[test]
    fn test_beyond_capacity_is_flagged_or_clean() {
        let data = [10u8; 20];
        let clean = encode_block(&data, 10);
        let decoder = RsDecoder::new(10);

        // 6 errors exceed t=5; must never hand back a silently wrong block
        let mut corrupted = clean.clone();
        for e in 0..6 {
            corrupted[e * 2] ^= 0x3C;
        }
        match decoder.correct(&mut corrupted) {
            None => {}
            Some(_) => assert_eq!(corrupted, clean),
        }
    }

    #[test]
    fn test_parity_matches_known_vector() {
        // "HELLO WORLD" alphanumeric at V1-Q, from the ISO worked example
        let data = [32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236];
        let parity = RsEncoder::new(13).parity(&data);
        assert_eq!(
            parity,
            vec![168, 72, 22, 82, 217, 54, 156, 0, 46, 15, 180, 122, 16]
        );
    }
}
