//! Dirty-flag cache for derived values.
//!
//! [`Cached<T>`] stores a value computed from other state. Writers call
//! [`Cached::invalidate`] when an input changes; the next read recomputes.
//! Unlike a reactive binding, the compute function is supplied at read time,
//! so it can borrow whatever state the owner holds.

/// A lazily recomputed value.
///
/// # Example
///
/// ```
/// use horizon_grid_core::Cached;
///
/// let mut data = vec![1, 2, 3];
/// let mut total = Cached::new();
///
/// assert_eq!(*total.get_or_compute(|| data.iter().sum::<i32>()), 6);
///
/// data.push(4);
/// total.invalidate();
/// assert_eq!(*total.get_or_compute(|| data.iter().sum::<i32>()), 10);
/// ```
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
    dirty: bool,
    computations: u64,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cached<T> {
    /// Create an empty, dirty cache.
    pub fn new() -> Self {
        Self {
            value: None,
            dirty: true,
            computations: 0,
        }
    }

    /// Return the cached value, recomputing it first if dirty.
    pub fn get_or_compute<F>(&mut self, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if self.dirty {
            self.value = None;
            self.dirty = false;
        }
        if self.value.is_none() {
            self.computations += 1;
        }
        self.value.get_or_insert_with(compute)
    }

    /// The cached value if it is fresh.
    pub fn peek(&self) -> Option<&T> {
        if self.dirty { None } else { self.value.as_ref() }
    }

    /// Mark the value stale. The next read recomputes.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Check if the cache needs recalculation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the value has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
