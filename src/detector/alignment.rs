//! Bottom-right alignment pattern search.
//!
//! The alignment pattern is a single dark module inside a light 3x3 ring;
//! near the predicted location we look for a dark run about one module
//! wide in both axes with light on all four sides.

use crate::models::{BitMatrix, Point};

/// Search a window around `predicted` for the alignment center.
/// Returns the refined center, or `None` when nothing in the window looks
/// like an alignment pattern.
pub fn locate_alignment(
    binary: &BitMatrix,
    predicted: Point,
    module_size: f32,
) -> Option<Point> {
    let radius = (module_size * 2.5).ceil() as i32;
    let px = predicted.x.round() as i32;
    let py = predicted.y.round() as i32;

    let mut best: Option<(Point, f32)> = None;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let x = px + dx;
            let y = py + dy;
            if x < 0 || y < 0 || x >= binary.width() as i32 || y >= binary.height() as i32 {
                continue;
            }
            if !binary.get(x as usize, y as usize) {
                continue;
            }
            let Some(center) = check_center(binary, x, y, module_size) else {
                continue;
            };
            let distance = center.distance(&predicted);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((center, distance));
            }
        }
    }
    best.map(|(center, _)| center)
}

/// Verify the dark run through (x, y) is about one module wide in both
/// axes and flanked by light; return its midpoint.
fn check_center(binary: &BitMatrix, x: i32, y: i32, module_size: f32) -> Option<Point> {
    let (left, right) = run_extent(binary, x, y, 1, 0)?;
    let width = (right - left + 1) as f32;
    if width < module_size * 0.4 || width > module_size * 1.9 {
        return None;
    }

    let (top, bottom) = run_extent(binary, x, y, 0, 1)?;
    let height = (bottom - top + 1) as f32;
    if height < module_size * 0.4 || height > module_size * 1.9 {
        return None;
    }

    Some(Point::new(
        (left + right) as f32 / 2.0,
        (top + bottom) as f32 / 2.0,
    ))
}

/// Extent of the dark run through (x, y) along (dx, dy); `None` when the
/// run leaves the image or never ends within a plausible width
fn run_extent(binary: &BitMatrix, x: i32, y: i32, dx: i32, dy: i32) -> Option<(i32, i32)> {
    let limit = 64;
    let walk = |sign: i32| -> Option<i32> {
        let mut step = 0;
        loop {
            let nx = x + dx * (step + 1) * sign;
            let ny = y + dy * (step + 1) * sign;
            if nx < 0 || ny < 0 || nx >= binary.width() as i32 || ny >= binary.height() as i32 {
                return None;
            }
            if !binary.get(nx as usize, ny as usize) {
                return Some(step);
            }
            step += 1;
            if step > limit {
                return None;
            }
        }
    };
    let forward = walk(1)?;
    let backward = walk(-1)?;
    if dx != 0 {
        Some((x - backward, x + forward))
    } else {
        Some((y - backward, y + forward))
    }
}
