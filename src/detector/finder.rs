//! Finder pattern detection by 1:1:3:1:1 run scanning.
//!
//! Horizontal row scans propose candidates; each candidate must survive a
//! vertical and a diagonal cross-check through its putative center before
//! clustering.

use crate::models::{BitMatrix, Point};

/// One confirmed finder pattern in image coordinates
#[derive(Debug, Clone, Copy)]
pub struct FinderPattern {
    pub center: Point,
    pub module_size: f32,
}

/// Per-run tolerance against the ideal 1:1:3:1:1 ratio, in modules
const RUN_TOLERANCE: f32 = 0.5;
/// Candidates closer than this many modules collapse into one cluster
const CLUSTER_RADIUS_MODULES: f32 = 3.0;

pub struct FinderDetector;

impl FinderDetector {
    /// Scan the whole image
    pub fn detect(binary: &BitMatrix) -> Vec<FinderPattern> {
        Self::detect_in_region(binary, 0, binary.width(), 0, binary.height())
    }

    /// Scan a sub-rectangle [x0, x1) x [y0, y1)
    pub fn detect_in_region(
        binary: &BitMatrix,
        x0: usize,
        x1: usize,
        y0: usize,
        y1: usize,
    ) -> Vec<FinderPattern> {
        let x1 = x1.min(binary.width());
        let y1 = y1.min(binary.height());
        let mut clusters: Vec<Cluster> = Vec::new();

        for y in y0..y1 {
            for candidate in Self::scan_row(binary, y, x0, x1) {
                let Some(confirmed) = Self::cross_check(binary, &candidate) else {
                    continue;
                };
                let radius = confirmed.module_size * CLUSTER_RADIUS_MODULES;
                match clusters
                    .iter_mut()
                    .find(|c| c.mean().distance(&confirmed.center) < radius.max(3.0))
                {
                    Some(cluster) => cluster.absorb(&confirmed),
                    None => clusters.push(Cluster::seed(&confirmed)),
                }
            }
        }

        // A real finder is re-confirmed on most of its ~3-module-tall core;
        // single-row clusters are noise
        clusters
            .into_iter()
            .filter(|c| c.count >= 2)
            .map(|c| c.into_pattern())
            .collect()
    }

    /// Find 1:1:3:1:1 dark/light run sequences along one row
    fn scan_row(binary: &BitMatrix, y: usize, x0: usize, x1: usize) -> Vec<RowCandidate> {
        let mut candidates = Vec::new();
        if x1 <= x0 {
            return candidates;
        }

        // (start, length, dark) runs across the row
        let mut runs: Vec<(usize, usize, bool)> = Vec::new();
        let mut run_start = x0;
        let mut run_color = binary.get(x0, y);
        for x in x0 + 1..x1 {
            let color = binary.get(x, y);
            if color != run_color {
                runs.push((run_start, x - run_start, run_color));
                run_start = x;
                run_color = color;
            }
        }
        runs.push((run_start, x1 - run_start, run_color));

        for window in runs.windows(5) {
            if !window[0].2 || window[1].2 || !window[2].2 || window[3].2 || !window[4].2 {
                continue;
            }
            let total: usize = window.iter().map(|r| r.1).sum();
            let unit = total as f32 / 7.0;
            if unit < 1.0 {
                continue;
            }
            let ideal = [1.0, 1.0, 3.0, 1.0, 1.0];
            let fits = window
                .iter()
                .zip(ideal)
                .all(|(run, want)| (run.1 as f32 / unit - want).abs() <= RUN_TOLERANCE);
            if fits {
                let center_x = window[2].0 as f32 + window[2].1 as f32 / 2.0;
                candidates.push(RowCandidate {
                    x: center_x,
                    y: y as f32,
                    module_size: unit,
                });
            }
        }
        candidates
    }

    /// Re-scan the candidate vertically and diagonally through its center;
    /// both must show the same 1:1:3:1:1 structure
    fn cross_check(binary: &BitMatrix, candidate: &RowCandidate) -> Option<FinderPattern> {
        let cx = candidate.x.round() as i32;
        let cy = candidate.y as i32;

        let (center_y, v_unit) = Self::check_axis(binary, cx, cy, 0, 1, candidate.module_size)?;
        let cy = center_y.round() as i32;
        let (center_x, _) = Self::check_axis(binary, cx, cy, 1, 0, candidate.module_size)?;
        Self::check_axis(binary, center_x.round() as i32, cy, 1, 1, candidate.module_size)?;

        Some(FinderPattern {
            center: Point::new(center_x, center_y),
            module_size: (candidate.module_size + v_unit) / 2.0,
        })
    }

    /// Walk out from (cx, cy) along (dx, dy) and its negation, collecting
    /// the dark-light-dark run structure. Returns the refined center
    /// coordinate along the axis and the unit size.
    fn check_axis(
        binary: &BitMatrix,
        cx: i32,
        cy: i32,
        dx: i32,
        dy: i32,
        expected_unit: f32,
    ) -> Option<(f32, f32)> {
        let limit = (expected_unit * 8.0) as i32;
        if !binary.get(cx as usize, cy as usize) {
            return None;
        }

        let count_runs = |sign: i32| -> Option<[i32; 3]> {
            let mut runs = [0i32; 3];
            let mut step = 1;
            let mut phase = 0;
            let mut dark = true;
            while phase < 3 {
                let x = cx + dx * step * sign;
                let y = cy + dy * step * sign;
                if x < 0 || y < 0 || x >= binary.width() as i32 || y >= binary.height() as i32 {
                    // running off the edge ends the outer dark run
                    if phase == 2 {
                        break;
                    }
                    return None;
                }
                if binary.get(x as usize, y as usize) == dark {
                    runs[phase] += 1;
                } else {
                    phase += 1;
                    dark = !dark;
                    if phase < 3 {
                        runs[phase] = 1;
                    }
                }
                step += 1;
                if step > limit {
                    if phase == 2 {
                        break;
                    }
                    return None;
                }
            }
            Some(runs)
        };

        let fwd = count_runs(1)?;
        let back = count_runs(-1)?;

        let center = 1 + fwd[0] + back[0];
        let runs = [
            back[2] as f32,
            back[1] as f32,
            center as f32,
            fwd[1] as f32,
            fwd[2] as f32,
        ];
        let total: f32 = runs.iter().sum();
        let unit = total / 7.0;
        let ideal = [1.0, 1.0, 3.0, 1.0, 1.0];
        let fits = runs
            .iter()
            .zip(ideal)
            .all(|(&run, want)| (run / unit - want).abs() <= RUN_TOLERANCE);
        if !fits {
            return None;
        }

        let along = if dx != 0 { cx } else { cy } as f32;
        let refined = along + (fwd[0] as f32 - back[0] as f32) / 2.0;
        Some((refined, unit))
    }
}

struct RowCandidate {
    x: f32,
    y: f32,
    module_size: f32,
}

struct Cluster {
    sum_x: f32,
    sum_y: f32,
    sum_unit: f32,
    count: usize,
}

impl Cluster {
    fn seed(p: &FinderPattern) -> Self {
        Self {
            sum_x: p.center.x,
            sum_y: p.center.y,
            sum_unit: p.module_size,
            count: 1,
        }
    }

    fn absorb(&mut self, p: &FinderPattern) {
        self.sum_x += p.center.x;
        self.sum_y += p.center.y;
        self.sum_unit += p.module_size;
        self.count += 1;
    }

    fn mean(&self) -> Point {
        Point::new(self.sum_x / self.count as f32, self.sum_y / self.count as f32)
    }

    fn into_pattern(self) -> FinderPattern {
        let center = self.mean();
        FinderPattern {
            center,
            module_size: self.sum_unit / self.count as f32,
        }
    }
}
