//! Mask evaluation: the four penalty rules scored over a candidate grid.
//!
//! N1 rewards breaking up long runs, N2 punishes solid 2x2 blocks, N3
//! punishes accidental finder lookalikes (1:1:3:1:1 with a 4-module light
//! margin), N4 punishes dark/light imbalance in 5% steps.

use crate::models::Grid;

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Total penalty of a fully drawn, masked grid
pub fn score(grid: &Grid) -> i32 {
    let size = grid.size();
    let mut result = 0;

    // Rows: same-color runs and finder lookalikes
    for y in 0..size {
        let mut run_color = false;
        let mut run_len = 0i32;
        let mut history = FinderRunHistory::new(size as i32);
        for x in 0..size {
            if grid.get(x, y).is_dark() == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += PENALTY_N1;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                history.push(run_len);
                if !run_color {
                    result += history.count_lookalikes() * PENALTY_N3;
                }
                run_color = grid.get(x, y).is_dark();
                run_len = 1;
            }
        }
        result += history.terminate(run_color, run_len) * PENALTY_N3;
    }

    // Columns: same accounting, transposed
    for x in 0..size {
        let mut run_color = false;
        let mut run_len = 0i32;
        let mut history = FinderRunHistory::new(size as i32);
        for y in 0..size {
            if grid.get(x, y).is_dark() == run_color {
                run_len += 1;
                if run_len == 5 {
                    result += PENALTY_N1;
                } else if run_len > 5 {
                    result += 1;
                }
            } else {
                history.push(run_len);
                if !run_color {
                    result += history.count_lookalikes() * PENALTY_N3;
                }
                run_color = grid.get(x, y).is_dark();
                run_len = 1;
            }
        }
        result += history.terminate(run_color, run_len) * PENALTY_N3;
    }

    // 2x2 same-color blocks
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = grid.get(x, y).is_dark();
            if color == grid.get(x + 1, y).is_dark()
                && color == grid.get(x, y + 1).is_dark()
                && color == grid.get(x + 1, y + 1).is_dark()
            {
                result += PENALTY_N2;
            }
        }
    }

    // Dark/light balance: 10 * floor(|dark% - 50| / 5), computed exactly
    // over the rational dark ratio
    let total = (size * size) as i64;
    let dark = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .filter(|&(x, y)| grid.get(x, y).is_dark())
        .count() as i64;
    let deviation = (dark * 100 - total * 50).abs();
    result += (deviation / (5 * total)) as i32 * PENALTY_N4;

    result
}

/// Rolling window of the last seven run lengths on a scan line, used to
/// spot 1:1:3:1:1 sequences with enough light margin on either side.
struct FinderRunHistory {
    line_len: i32,
    runs: [i32; 7],
}

impl FinderRunHistory {
    fn new(line_len: i32) -> Self {
        Self {
            line_len,
            runs: [0; 7],
        }
    }

    fn push(&mut self, mut run_len: i32) {
        if self.runs[0] == 0 {
            // Leading edge counts as unlimited light margin
            run_len += self.line_len;
        }
        self.runs.rotate_right(1);
        self.runs[0] = run_len;
    }

    fn count_lookalikes(&self) -> i32 {
        let r = &self.runs;
        let n = r[1];
        let core = n > 0 && r[2] == n && r[3] == n * 3 && r[4] == n && r[5] == n;
        i32::from(core && r[0] >= n * 4 && r[6] >= n)
            + i32::from(core && r[6] >= n * 4 && r[0] >= n)
    }

    fn terminate(mut self, run_color: bool, mut run_len: i32) -> i32 {
        if run_color {
            self.push(run_len);
            run_len = 0;
        }
        self.push(run_len + self.line_len);
        self.count_lookalikes()
    }
}
