//! From three finder centers to an N x N module matrix: orientation,
//! version estimation, perspective fit, and majority-vote sampling.

use crate::codec::tables::side_length;
use crate::decoder::version_info;
use crate::detector::alignment::locate_alignment;
use crate::detector::finder::FinderPattern;
use crate::diag::{DiagEvent, DiagnosticSink};
use crate::error::{Error, QrResult};
use crate::models::{BitMatrix, Point};
use crate::utils::geometry::PerspectiveTransform;

/// Fraction of timing cells that must alternate correctly for a sampled
/// grid to be considered structurally sound
const TIMING_AGREEMENT: f32 = 0.75;

/// Assign the three confirmed finder patterns to their corners.
///
/// The top-left pattern sits at the right angle; the cross product of the
/// two edge vectors tells top-right from bottom-left. Also returns the
/// module pitch implied by the finder spacing.
pub fn orient_patterns(patterns: &[FinderPattern; 3]) -> Option<(Point, Point, Point, f32)> {
    if patterns.iter().any(|p| p.module_size < 1.0) {
        return None;
    }

    // The corner whose edges are most orthogonal is the top-left
    let mut best_idx = 0usize;
    let mut best_cos = f32::INFINITY;
    for i in 0..3 {
        let p = &patterns[i].center;
        let p1 = &patterns[(i + 1) % 3].center;
        let p2 = &patterns[(i + 2) % 3].center;

        let (v1x, v1y) = (p1.x - p.x, p1.y - p.y);
        let (v2x, v2y) = (p2.x - p.x, p2.y - p.y);
        let denom = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
        if denom == 0.0 {
            continue;
        }
        let cos = ((v1x * v2x + v1y * v2y) / denom).abs();
        if cos < best_cos {
            best_cos = cos;
            best_idx = i;
        }
    }

    let tl = &patterns[best_idx];
    let p1 = &patterns[(best_idx + 1) % 3];
    let p2 = &patterns[(best_idx + 2) % 3];

    let cross = (p1.center.x - tl.center.x) * (p2.center.y - tl.center.y)
        - (p1.center.y - tl.center.y) * (p2.center.x - tl.center.x);
    let (tr, bl) = if cross > 0.0 { (p1, p2) } else { (p2, p1) };

    let avg_module = (tl.module_size + tr.module_size + bl.module_size) / 3.0;
    Some((tl.center, tr.center, bl.center, avg_module))
}

/// Estimate the version from finder spacing: V = round((dist/pitch - 10)/4)
fn estimate_version(d_tr: f32, d_bl: f32, module_size: f32) -> Option<u8> {
    let version_from = |distance: f32| -> Option<i32> {
        let raw_dim = distance / module_size + 7.0;
        if raw_dim < 19.0 {
            return None;
        }
        Some(((raw_dim - 17.0) / 4.0).round() as i32)
    };

    let v1 = version_from(d_tr)?;
    let v2 = version_from(d_bl)?;
    let version = if v1 == v2 {
        v1
    } else if (v1 - v2).abs() <= 1 {
        {
            let sum = v1 + v2;
            let q = sum / 2;
            let r = sum % 2;
            if r > 0 { q + 1 } else { q }
        }
    } else {
        return None;
    };
    (1..=40).contains(&version).then_some(version as u8)
}

/// Grayscale sampler for one located symbol
pub struct Sampler<'a> {
    binary: &'a BitMatrix,
    gray: &'a [u8],
    width: usize,
    height: usize,
    threshold: u8,
}

impl<'a> Sampler<'a> {
    pub fn new(
        binary: &'a BitMatrix,
        gray: &'a [u8],
        width: usize,
        height: usize,
        threshold: u8,
    ) -> Self {
        Self {
            binary,
            gray,
            width,
            height,
            threshold,
        }
    }

    /// Produce the module matrix for the symbol spanned by the three
    /// finder centers.
    ///
    /// The pitch-based version estimate drives the first sampling pass;
    /// for V7+ the BCH-protected version info can override it, and a
    /// structurally unsound grid falls back to the neighboring versions.
    pub fn sample_symbol(
        &self,
        tl: Point,
        tr: Point,
        bl: Point,
        module_size: f32,
        max_version: u8,
        sink: &dyn DiagnosticSink,
    ) -> QrResult<BitMatrix> {
        let d_tr = tl.distance(&tr);
        let d_bl = tl.distance(&bl);
        let estimate = estimate_version(d_tr, d_bl, module_size)
            .ok_or_else(|| Error::SamplingFailed("finder spacing fits no version".into()))?
            .min(max_version);
        sink.note(&DiagEvent::VersionEstimated { version: estimate });

        // Refine the global threshold on the symbol's own neighborhood so
        // uneven illumination elsewhere in the frame cannot skew sampling
        let threshold = self.local_threshold(tl, tr, bl, module_size);

        let matrix = self.sample_at_version(tl, tr, bl, estimate, threshold, sink)?;

        if estimate >= 7 {
            match version_info::read_version(&matrix) {
                Some(confirmed) if confirmed == estimate => {
                    sink.note(&DiagEvent::VersionConfirmed { version: confirmed });
                    return Ok(matrix);
                }
                Some(confirmed) if confirmed <= max_version => {
                    sink.note(&DiagEvent::VersionConfirmed { version: confirmed });
                    let resampled =
                        self.sample_at_version(tl, tr, bl, confirmed, threshold, sink)?;
                    return if timing_agrees(&resampled) {
                        Ok(resampled)
                    } else {
                        Ok(matrix)
                    };
                }
                _ => {
                    // Both copies unreadable (or capped): trust the pitch
                    // estimate only if the grid is structurally sound
                    if timing_agrees(&matrix) {
                        return Ok(matrix);
                    }
                    for neighbor in [estimate.saturating_sub(1), estimate + 1] {
                        if !(7..=max_version).contains(&neighbor) {
                            continue;
                        }
                        let retry =
                            self.sample_at_version(tl, tr, bl, neighbor, threshold, sink)?;
                        if timing_agrees(&retry) {
                            return Ok(retry);
                        }
                    }
                    return Err(Error::VersionInfoUnreadable);
                }
            }
        }

        if timing_agrees(&matrix) {
            return Ok(matrix);
        }
        for neighbor in [estimate.saturating_sub(1), estimate + 1] {
            if !(1..=max_version.min(6)).contains(&neighbor) || neighbor == estimate {
                continue;
            }
            let retry = self.sample_at_version(tl, tr, bl, neighbor, threshold, sink)?;
            if timing_agrees(&retry) {
                return Ok(retry);
            }
        }
        Err(Error::SamplingFailed(
            "timing patterns disagree at every candidate version".into(),
        ))
    }

    /// Fit the perspective transform for one candidate version and sample
    /// every module center by majority vote.
    fn sample_at_version(
        &self,
        tl: Point,
        tr: Point,
        bl: Point,
        version: u8,
        threshold: u8,
        sink: &dyn DiagnosticSink,
    ) -> QrResult<BitMatrix> {
        let n = side_length(version) as f32;
        // Module pitch implied by this candidate dimension
        let module_size = (tl.distance(&tr) + tl.distance(&bl)) / 2.0 / (n - 7.0);

        // Parallelogram completion gives the fourth correspondence; for
        // V2+ the bottom-right alignment pattern replaces it when found
        let br_corner = Point::new(tr.x + bl.x - tl.x, tr.y + bl.y - tl.y);
        let mut src = [
            Point::new(3.5, 3.5),
            Point::new(n - 3.5, 3.5),
            Point::new(3.5, n - 3.5),
            Point::new(n - 3.5, n - 3.5),
        ];
        let mut dst = [tl, tr, bl, br_corner];

        if version >= 2 {
            let coarse = PerspectiveTransform::from_points(&src, &dst)
                .ok_or_else(|| Error::SamplingFailed("degenerate finder geometry".into()))?;
            let predicted = coarse.transform(&Point::new(n - 6.5, n - 6.5));
            match locate_alignment(self.binary, predicted, module_size) {
                Some(found) => {
                    src[3] = Point::new(n - 6.5, n - 6.5);
                    dst[3] = found;
                }
                None => sink.warn(&DiagEvent::AlignmentMissed { predicted }),
            }
        }

        let transform = PerspectiveTransform::from_points(&src, &dst)
            .ok_or_else(|| Error::SamplingFailed("degenerate perspective fit".into()))?;

        let size = side_length(version);
        let mut matrix = BitMatrix::new(size, size);
        for y in 0..size {
            for x in 0..size {
                if self.sample_module(&transform, x, y, threshold) {
                    matrix.set(x, y, true);
                }
            }
        }
        Ok(matrix)
    }

    /// Majority vote over the module center and four half-offset probes
    fn sample_module(
        &self,
        transform: &PerspectiveTransform,
        x: usize,
        y: usize,
        threshold: u8,
    ) -> bool {
        let offsets = [
            (0.0, 0.0),
            (-0.25, 0.0),
            (0.25, 0.0),
            (0.0, -0.25),
            (0.0, 0.25),
        ];
        let mut dark_votes = 0;
        for (dx, dy) in offsets {
            let p = transform.transform(&Point::new(x as f32 + 0.5 + dx, y as f32 + 0.5 + dy));
            if self.pixel_is_dark(p, threshold) {
                dark_votes += 1;
            }
        }
        dark_votes >= 3
    }

    fn pixel_is_dark(&self, p: Point, threshold: u8) -> bool {
        let x = p.x.round() as i32;
        let y = p.y.round() as i32;
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.gray[y as usize * self.width + x as usize] <= threshold
    }

    /// Otsu recomputed over the symbol's bounding box (finder corners plus
    /// the estimated fourth corner, padded by four modules). Falls back to
    /// the global threshold when the box degenerates.
    fn local_threshold(&self, tl: Point, tr: Point, bl: Point, module_size: f32) -> u8 {
        let br = Point::new(tr.x + bl.x - tl.x, tr.y + bl.y - tl.y);
        let pad = module_size * 4.0;
        let corners = [tl, tr, bl, br];
        let min_x = corners.iter().fold(f32::INFINITY, |a, p| a.min(p.x)) - pad;
        let max_x = corners.iter().fold(f32::NEG_INFINITY, |a, p| a.max(p.x)) + pad;
        let min_y = corners.iter().fold(f32::INFINITY, |a, p| a.min(p.y)) - pad;
        let max_y = corners.iter().fold(f32::NEG_INFINITY, |a, p| a.max(p.y)) + pad;

        let x0 = (min_x.max(0.0)) as usize;
        let y0 = (min_y.max(0.0)) as usize;
        let x1 = (max_x as usize + 1).min(self.width);
        let y1 = (max_y as usize + 1).min(self.height);
        if x1 <= x0 || y1 <= y0 {
            return self.threshold;
        }

        let mut patch = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            patch.extend_from_slice(&self.gray[y * self.width + x0..y * self.width + x1]);
        }
        crate::utils::binarization::otsu_threshold(&patch)
    }
}

/// At least `TIMING_AGREEMENT` of the timing cells alternate as required
fn timing_agrees(matrix: &BitMatrix) -> bool {
    let size = matrix.width();
    if size < 21 {
        return false;
    }
    let mut good = 0;
    let mut cells = 0;
    for i in 8..size - 8 {
        cells += 2;
        if matrix.get(i, 6) == (i % 2 == 0) {
            good += 1;
        }
        if matrix.get(6, i) == (i % 2 == 0) {
            good += 1;
        }
    }
    good as f32 >= cells as f32 * TIMING_AGREEMENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::finder::FinderPattern;

    fn pattern(x: f32, y: f32, m: f32) -> FinderPattern {
        FinderPattern {
            center: Point::new(x, y),
            module_size: m,
        }
    }

    #[test]
    fn test_orientation_upright() {
        let patterns = [
            pattern(30.0, 30.0, 4.0),
            pattern(130.0, 30.0, 4.0),
            pattern(30.0, 130.0, 4.0),
        ];
        let (tl, tr, bl, _) = orient_patterns(&patterns).unwrap();
        assert_eq!((tl.x, tl.y), (30.0, 30.0));
        assert_eq!((tr.x, tr.y), (130.0, 30.0));
        assert_eq!((bl.x, bl.y), (30.0, 130.0));
    }

    #[test]
    fn test_orientation_shuffled_input() {
        let patterns = [
            pattern(30.0, 130.0, 4.0),
            pattern(30.0, 30.0, 4.0),
            pattern(130.0, 30.0, 4.0),
        ];
        let (tl, tr, bl, _) = orient_patterns(&patterns).unwrap();
        assert_eq!((tl.x, tl.y), (30.0, 30.0));
        assert_eq!((tr.x, tr.y), (130.0, 30.0));
        assert_eq!((bl.x, bl.y), (30.0, 130.0));
    }

    #[test]
    fn test_version_estimate() {
        // V1 at pitch 4: finder centers are 14 modules apart
        assert_eq!(estimate_version(56.0, 56.0, 4.0), Some(1));
        // V3 at pitch 4: 22 modules apart
        assert_eq!(estimate_version(88.0, 88.5, 4.0), Some(3));
        // wildly inconsistent distances are rejected
        assert_eq!(estimate_version(56.0, 160.0, 4.0), None);
    }
}
