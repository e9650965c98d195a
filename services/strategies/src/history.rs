//! Fixed-capacity price history

/// Circular buffer of prices with O(1) "N sessions ago" access
///
/// Once full, each push overwrites the oldest entry. `lookback(0)` is the
/// most recent price.
#[derive(Debug, Clone)]
pub struct PriceRing {
    slots: Box<[f64]>,
    /// Index the next push writes to
    cursor: usize,
    len: usize,
}

impl PriceRing {
    /// A capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![f64::NAN; capacity.max(1)].into_boxed_slice(),
            cursor: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, price: f64) {
        self.slots[self.cursor] = price;
        self.cursor = (self.cursor + 1) % self.slots.len();
        if self.len < self.slots.len() {
            self.len += 1;
        }
    }

    /// Price `n` entries before the latest; NaN when `n >= len()`
    pub fn lookback(&self, n: usize) -> f64 {
        self.get(n).unwrap_or(f64::NAN)
    }

    /// Price `n` entries before the latest, `None` when history is too short
    pub fn get(&self, n: usize) -> Option<f64> {
        if n >= self.len {
            return None;
        }
        let capacity = self.slots.len();
        let index = (self.cursor + capacity - 1 - n) % capacity;
        Some(self.slots[index])
    }

    pub fn latest(&self) -> Option<f64> {
        self.get(0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Valid entries, newest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).filter_map(move |n| self.get(n))
    }
}
