//! Stuck detection.
//!
//! A generation is stuck when it has no live cells, or when its alive/dead
//! pattern already appeared in one of the last [`HISTORY_CAPACITY`]
//! recorded generations. Colors and ages are ignored: two generations with
//! the same shape but different colors are the same fingerprint.

use std::collections::VecDeque;

use wallife_types::Grid;

/// Number of recent fingerprints remembered.
pub const HISTORY_CAPACITY: usize = 10;

/// Bits per fingerprint word.
const WORD_BITS: usize = 64;

/// Bit-packed alive/dead pattern of a grid, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

impl Fingerprint {
    /// Fingerprint the alive/dead pattern of `grid`.
    pub fn of(grid: &Grid) -> Self {
        let words = grid.len().div_ceil(WORD_BITS);
        let mut bits = vec![0_u64; words];
        for (index, cell) in grid.cells().iter().enumerate() {
            if !cell.is_alive() {
                continue;
            }
            let word = index.checked_div(WORD_BITS).unwrap_or(0);
            let bit = index.checked_rem(WORD_BITS).unwrap_or(0);
            if let Some(slot) = bits.get_mut(word) {
                *slot |= 1_u64 << bit;
            }
        }
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            bits,
        }
    }

    /// Number of live cells encoded.
    pub fn live_count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }
}

/// Bounded FIFO of recent fingerprints that classifies generations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StuckDetector {
    history: VecDeque<Fingerprint>,
}

impl StuckDetector {
    /// Create a detector with an empty history.
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Classify `grid`, recording its fingerprint when it is new.
    ///
    /// An extinct grid is stuck and is not recorded. A grid whose
    /// fingerprint is already in the history is stuck and is not recorded
    /// again. Otherwise the fingerprint is pushed (evicting the oldest at
    /// capacity) and the grid is not stuck.
    pub fn is_stuck(&mut self, grid: &Grid) -> bool {
        if grid.is_extinct() {
            return true;
        }
        let fingerprint = Fingerprint::of(grid);
        if self.history.contains(&fingerprint) {
            return true;
        }
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(fingerprint);
        false
    }

    /// Forget every recorded generation.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Number of recorded fingerprints.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wallife_types::{Cell, Rgb};

    use super::*;

    /// A 1x16 grid with exactly the cells in `alive` set.
    fn strip(alive: &[usize]) -> Grid {
        let mut grid = Grid::new(1, 16);
        for &col in alive {
            grid.set(0, col, Cell::newborn(Rgb::WHITE));
        }
        grid
    }

    #[test]
    fn extinct_grid_is_stuck_and_not_recorded() {
        let mut detector = StuckDetector::new();
        assert!(detector.is_stuck(&Grid::new(4, 4)));
        assert!(detector.is_empty());
    }

    #[test]
    fn new_pattern_is_recorded() {
        let mut detector = StuckDetector::new();
        assert!(!detector.is_stuck(&strip(&[1])));
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn repeat_within_window_is_stuck() {
        let mut detector = StuckDetector::new();
        assert!(!detector.is_stuck(&strip(&[0])));
        for col in 1..HISTORY_CAPACITY {
            assert!(!detector.is_stuck(&strip(&[col])));
        }
        // strip([0]) is the oldest of exactly 10 entries.
        assert!(detector.is_stuck(&strip(&[0])));
    }

    #[test]
    fn repeat_older_than_window_is_not_stuck() {
        let mut detector = StuckDetector::new();
        assert!(!detector.is_stuck(&strip(&[0])));
        for col in 1..=HISTORY_CAPACITY {
            assert!(!detector.is_stuck(&strip(&[col])));
        }
        // Eleven generations later the first one has been evicted.
        assert_eq!(detector.len(), HISTORY_CAPACITY);
        assert!(!detector.is_stuck(&strip(&[0])));
    }

    #[test]
    fn colors_are_ignored() {
        let mut detector = StuckDetector::new();
        let red = Grid::from_pattern(&["#.#"], Rgb::new(255, 0, 0)).unwrap();
        let blue = Grid::from_pattern(&["#.#"], Rgb::new(0, 0, 255)).unwrap();
        assert!(!detector.is_stuck(&red));
        assert!(detector.is_stuck(&blue));
    }

    #[test]
    fn still_life_is_stuck_on_second_sight() {
        let mut detector = StuckDetector::new();
        let block = Grid::from_pattern(&["##", "##"], Rgb::WHITE).unwrap();
        assert!(!detector.is_stuck(&block));
        assert!(detector.is_stuck(&block));
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn clear_forgets_history() {
        let mut detector = StuckDetector::new();
        let grid = strip(&[3]);
        assert!(!detector.is_stuck(&grid));
        detector.clear();
        assert!(!detector.is_stuck(&grid));
    }

    #[test]
    fn fingerprint_spans_multiple_words() {
        let mut grid = Grid::new(10, 10);
        grid.set(0, 0, Cell::newborn(Rgb::WHITE));
        grid.set(9, 9, Cell::newborn(Rgb::WHITE));
        let fp = Fingerprint::of(&grid);
        assert_eq!(fp.live_count(), 2);
        assert_ne!(fp, Fingerprint::of(&Grid::new(10, 10)));
    }

    #[test]
    fn same_bits_different_shape_differ() {
        let wide = Grid::from_pattern(&["#..."], Rgb::WHITE).unwrap();
        let tall = Grid::from_pattern(&["#", ".", ".", "."], Rgb::WHITE).unwrap();
        assert_ne!(Fingerprint::of(&wide), Fingerprint::of(&tall));
    }
}
