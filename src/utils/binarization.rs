//! Global Otsu thresholding.

use crate::models::BitMatrix;

/// Threshold maximizing between-class variance over the histogram
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u32; 256];
    for &value in gray {
        histogram[value as usize] += 1;
    }
    let total = gray.len() as u64;
    if total == 0 {
        return 128;
    }

    let weighted_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &count)| v as u64 * count as u64)
        .sum();

    let mut best_threshold = 128u8;
    let mut best_variance = 0.0f64;
    let mut background_count = 0u64;
    let mut background_sum = 0u64;

    for threshold in 0..256usize {
        background_count += histogram[threshold] as u64;
        if background_count == 0 {
            continue;
        }
        let foreground_count = total - background_count;
        if foreground_count == 0 {
            break;
        }
        background_sum += threshold as u64 * histogram[threshold] as u64;

        let mean_bg = background_sum as f64 / background_count as f64;
        let mean_fg = (weighted_sum - background_sum) as f64 / foreground_count as f64;
        let diff = mean_bg - mean_fg;
        let variance = background_count as f64 * foreground_count as f64 * diff * diff;
        if variance > best_variance {
            best_variance = variance;
            best_threshold = threshold as u8;
        }
    }
    best_threshold
}

/// Binarize against a fixed threshold; true = dark (at or below it)
pub fn binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if gray[y * width + x] <= threshold {
                binary.set(x, y, true);
            }
        }
    }
    binary
}

/// Binarize against the Otsu threshold of the buffer itself
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    binarize(gray, width, height, otsu_threshold(gray))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bimodal_split() {
        let mut gray = vec![30u8; 50];
        gray.extend(vec![220u8; 50]);
        let threshold = otsu_threshold(&gray);
        assert!((30..220).contains(&threshold));

        let binary = otsu_binarize(&gray, 10, 10);
        assert!(binary.get(0, 0));
        assert!(!binary.get(9, 9));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(otsu_threshold(&[]), 128);
    }
}
