use super::BitMatrix;

/// State of one cell during symbol layout.
///
/// Function cells are fixed by the symbol structure (finders, timing,
/// alignment, format/version info) and are never masked; data cells carry
/// codeword bits and are XOR'd with the chosen mask pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Light,
    Dark,
    FunctionLight,
    FunctionDark,
}

impl Module {
    /// Whether this cell renders dark
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Dark | Module::FunctionDark)
    }

    /// Whether this cell belongs to a function pattern
    pub fn is_function(self) -> bool {
        matches!(self, Module::FunctionLight | Module::FunctionDark)
    }
}

/// Square module grid used while laying out a symbol.
///
/// One byte per cell so the four module states stay distinguishable until
/// layout finishes; `to_matrix` collapses to the packed boolean form.
#[derive(Debug, Clone)]
pub struct Grid {
    size: usize,
    cells: Vec<Module>,
}

impl Grid {
    /// Create an all-light grid of `size` x `size` modules
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Module::Light; size * size],
        }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell state at (x, y); coordinates must be in bounds
    pub fn get(&self, x: usize, y: usize) -> Module {
        self.cells[y * self.size + x]
    }

    /// Mark (x, y) as a function cell with the given color
    pub fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.cells[y * self.size + x] = if dark {
            Module::FunctionDark
        } else {
            Module::FunctionLight
        };
    }

    /// Set the color of a data cell at (x, y)
    pub fn set_data(&mut self, x: usize, y: usize, dark: bool) {
        self.cells[y * self.size + x] = if dark { Module::Dark } else { Module::Light };
    }

    /// Flip the color of a data cell; function cells are left untouched
    pub fn toggle_data(&mut self, x: usize, y: usize) {
        let cell = &mut self.cells[y * self.size + x];
        *cell = match *cell {
            Module::Light => Module::Dark,
            Module::Dark => Module::Light,
            function => function,
        };
    }

    /// Collapse to a packed boolean matrix (true = dark)
    pub fn to_matrix(&self) -> BitMatrix {
        let mut matrix = BitMatrix::new(self.size, self.size);
        for y in 0..self.size {
            for x in 0..self.size {
                if self.get(x, y).is_dark() {
                    matrix.set(x, y, true);
                }
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_cells_resist_toggle() {
        let mut grid = Grid::new(21);
        grid.set_function(6, 6, true);
        grid.toggle_data(6, 6);
        assert_eq!(grid.get(6, 6), Module::FunctionDark);

        grid.set_data(10, 10, false);
        grid.toggle_data(10, 10);
        assert_eq!(grid.get(10, 10), Module::Dark);
    }

    #[test]
    fn test_collapse_to_matrix() {
        let mut grid = Grid::new(21);
        grid.set_function(0, 0, true);
        grid.set_data(1, 0, true);
        let matrix = grid.to_matrix();
        assert!(matrix.get(0, 0));
        assert!(matrix.get(1, 0));
        assert!(!matrix.get(2, 0));
    }
}
