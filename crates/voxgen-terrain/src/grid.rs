//! Square 2D grids indexed `(x, z)`, stored x-major.

/// A `size × size` grid of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid2<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid2<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn filled(size: usize, fill: T) -> Self {
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at `(x, z)`.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> T {
        self.cells[self.index(x, z)]
    }

    /// Overwrite the value at `(x, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let i = self.index(x, z);
        self.cells[i] = value;
    }

    /// All cells in x-major order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterate `(x, z, value)` in x-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / size, i % size, v))
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.size && z < self.size);
        x * self.size + z
    }
}
