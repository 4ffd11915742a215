//! RGBA to luminance conversion.
//!
//! Y = 0.30*R + 0.59*G + 0.11*B using fast integer arithmetic:
//! Y = (77*R + 151*G + 28*B) >> 8. Large frames go through the
//! row-parallel rayon path; the algorithms downstream are unchanged.

use rayon::prelude::*;

const COEF_R: u32 = 77;
const COEF_G: u32 = 151;
const COEF_B: u32 = 28;

/// Pixel count at which the parallel path starts paying for itself
const PARALLEL_THRESHOLD: usize = 1 << 20;

/// Convert an RGBA buffer (4 bytes per pixel, alpha ignored) to one
/// luminance byte per pixel
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(rgba.len(), width * height * 4);
    if width * height >= PARALLEL_THRESHOLD {
        return rgba_to_grayscale_parallel(rgba, width, height);
    }

    let mut gray = vec![0u8; width * height];
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        gray[i] = luminance(pixel[0], pixel[1], pixel[2]);
    }
    gray
}

/// Row-parallel conversion for large frames
pub fn rgba_to_grayscale_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(rgba.len(), width * height * 4);
    let mut gray = vec![0u8; width * height];

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 4;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 4;
            *out = luminance(rgba[idx], rgba[idx + 1], rgba[idx + 2]);
        }
    });
    gray
}

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * u32::from(r) + COEF_G * u32::from(g) + COEF_B * u32::from(b)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes() {
        let white = [255u8, 255, 255, 255];
        assert!(rgba_to_grayscale(&white, 1, 1)[0] >= 254);

        let black = [0u8, 0, 0, 255];
        assert_eq!(rgba_to_grayscale(&black, 1, 1)[0], 0);
    }

    #[test]
    fn test_channel_weights() {
        let red = rgba_to_grayscale(&[255, 0, 0, 255], 1, 1)[0];
        let green = rgba_to_grayscale(&[0, 255, 0, 255], 1, 1)[0];
        let blue = rgba_to_grayscale(&[0, 0, 255, 255], 1, 1)[0];
        assert!(green > red && red > blue);
    }

    #[test]
    fn test_parallel_matches_scalar() {
        let width = 64;
        let height = 48;
        let rgba: Vec<u8> = (0..width * height * 4)
            .map(|i| (i * 31 % 256) as u8)
            .collect();
        assert_eq!(
            rgba_to_grayscale(&rgba, width, height),
            rgba_to_grayscale_parallel(&rgba, width, height)
        );
    }
}
