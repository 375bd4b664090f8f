//! Weighted sampling without replacement.
//!
//! Items sit in an implicit binary tree over a flat vec, using 1-based
//! child/parent arithmetic: the children of slot `i` are `2i` and `2i + 1`.
//! Each slot carries the total weight of its subtree, so drawing an item
//! proportionally to weight and then removing it from future draws are both
//! O(log n) walks of the ancestor chain.

use rand::Rng;
use rand::rngs::StdRng;

/// Selecting from a selector with no remaining weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("selector: no remaining weight to select")]
pub struct SelectorEmpty;

/// An item selectable from a population with probability proportional to
/// its weight. `index` refers to an entry in some external list; `total`
/// is the derived subtree sum maintained by [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedItem {
    pub index: usize,
    pub weight: f64,
    total: f64,
}

impl WeightedItem {
    pub fn new(index: usize, weight: f64) -> Self {
        Self {
            index,
            weight,
            total: 0.0,
        }
    }

    /// Subtree total rooted at this item, valid after
    /// [`Selector::init`].
    pub fn total(&self) -> f64 {
        self.total
    }
}

/// A collection of weighted items supporting weighted selection without
/// replacement.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    items: Vec<WeightedItem>,
}

impl Selector {
    pub fn new(items: Vec<WeightedItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WeightedItem] {
        &self.items
    }

    /// Remaining selectable weight.
    pub fn total(&self) -> f64 {
        self.items.first().map_or(0.0, |it| it.total)
    }

    /// Recomputes every subtree total from the item weights, bottom-up.
    /// Must be called before the first [`select`](Selector::select) of an
    /// epoch; calling it again with unchanged weights yields the same
    /// totals.
    pub fn init(&mut self) {
        for it in &mut self.items {
            it.total = it.weight;
        }
        for i in (1..self.items.len()).rev() {
            let t = self.items[i].total;
            // parent of 1-based slot s is s/2
            self.items[((i + 1) >> 1) - 1].total += t;
        }
    }

    /// Draws one item with probability `weight / total`, zeroes its weight,
    /// and removes it from every ancestor total so it cannot be drawn again
    /// this epoch. Returns the item's `index`.
    pub fn select(&mut self, rng: &mut StdRng) -> Result<usize, SelectorEmpty> {
        if self.items.is_empty() || self.items[0].total == 0.0 {
            return Err(SelectorEmpty);
        }

        let mut r = self.items[0].total * rng.gen_range(0.0..1.0);
        let mut i = 1usize;
        loop {
            r -= self.items[i - 1].weight;
            if r <= 0.0 {
                break; // landed within this slot's own weight
            }
            i <<= 1; // left child
            let d = self.items[i - 1].total;
            if r > d {
                // past the whole left subtree; continue in the right child
                r -= d;
                i += 1;
            }
        }

        let w = self.items[i - 1].weight;
        let index = self.items[i - 1].index;

        self.items[i - 1].weight = 0.0;
        while i > 0 {
            self.items[i - 1].total -= w;
            i >>= 1;
        }

        Ok(index)
    }

    /// Alters the weight of the item at `slot`, propagating the change up
    /// the ancestor chain. Setting a live item's weight to zero removes it
    /// from future draws without selecting it.
    pub fn set_weight(&mut self, slot: usize, w: f64) {
        let delta = self.items[slot].weight - w;
        self.items[slot].weight = w;
        let mut i = slot + 1;
        while i > 0 {
            self.items[i - 1].total -= delta;
            i >>= 1;
        }
    }
}

impl FromIterator<(usize, f64)> for Selector {
    fn from_iter<T: IntoIterator<Item = (usize, f64)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(index, weight)| WeightedItem::new(index, weight))
                .collect(),
        )
    }
}
