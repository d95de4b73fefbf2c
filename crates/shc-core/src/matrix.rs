use rustfft::num_complex::Complex64;

/// Dense row-major complex matrix, one row per degree of freedom and one column per
/// frequency bin.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl ComplexMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex64::new(0.0, 0.0); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[Complex64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [Complex64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn zero_row(&mut self, row: usize) {
        for v in self.row_mut(row) {
            *v = Complex64::new(0.0, 0.0);
        }
    }

    /// Column `col` gathered into `out` (resized to `rows`).
    pub fn column_into(&self, col: usize, out: &mut Vec<Complex64>) {
        out.clear();
        out.extend((0..self.rows).map(|r| self.data[r * self.cols + col]));
    }
}
