//! Fixed-size bit grids.
//!
//! One bit per cell, row-major, 64 cells per word. Bitwise combinations
//! (`and`, `or`, `and_not`) work a word at a time, which is what makes the
//! packed board's bulk passability and coverage checks cheap.

use crate::core::Position;

/// A `width x height` grid of bits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitGrid {
    width: usize,
    height: usize,
    words: Vec<u64>,
}

impl BitGrid {
    /// An all-zero grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            words: vec![0; (width * height).div_ceil(64)],
        }
    }

    /// A grid with the given cells set.
    #[must_use]
    pub fn from_cells(width: usize, height: usize, cells: impl IntoIterator<Item = Position>) -> Self {
        let mut grid = Self::new(width, height);
        for pos in cells {
            grid.set(pos);
        }
        grid
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Word index and bit offset of `pos`, `None` off the grid.
    #[must_use]
    pub fn locate(&self, pos: Position) -> Option<(usize, u32)> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        let index = pos.y as usize * self.width + pos.x as usize;
        Some((index / 64, (index % 64) as u32))
    }

    /// Raw word `i`.
    #[must_use]
    pub fn word(&self, i: usize) -> u64 {
        self.words[i]
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> bool {
        self.locate(pos).is_some_and(|(w, b)| self.words[w] >> b & 1 == 1)
    }

    pub fn set(&mut self, pos: Position) {
        if let Some((w, b)) = self.locate(pos) {
            self.words[w] |= 1u64 << b;
        }
    }

    pub fn clear(&mut self, pos: Position) {
        if let Some((w, b)) = self.locate(pos) {
            self.words[w] &= !(1u64 << b);
        }
    }

    fn zip_with(&self, other: &BitGrid, op: impl Fn(u64, u64) -> u64) -> BitGrid {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        BitGrid {
            width: self.width,
            height: self.height,
            words: self.words.iter().zip(&other.words).map(|(&a, &b)| op(a, b)).collect(),
        }
    }

    #[must_use]
    pub fn and(&self, other: &BitGrid) -> BitGrid {
        self.zip_with(other, |a, b| a & b)
    }

    #[must_use]
    pub fn or(&self, other: &BitGrid) -> BitGrid {
        self.zip_with(other, |a, b| a | b)
    }

    /// Cells set here and clear in `other`.
    #[must_use]
    pub fn and_not(&self, other: &BitGrid) -> BitGrid {
        self.zip_with(other, |a, b| a & !b)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set cells in row-major order.
    pub fn iter_ones(&self) -> impl Iterator<Item = Position> + '_ {
        self.words.iter().enumerate().flat_map(move |(wi, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                let index = wi * 64 + bit;
                Some(Position::new((index % self.width) as i32, (index / self.width) as i32))
            })
        })
    }
}
