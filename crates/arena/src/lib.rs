//! Append-only Arena
//!
//! Typed storage for tree nodes. Values are pushed once and never freed
//! individually; everything is released when the arena is dropped. Handles
//! are plain indices, so parent links stored as handles never own anything.

use std::fmt;
use std::marker::PhantomData;

/// A handle to a value stored in an [`Arena<T>`].
pub struct Index<T> {
    raw: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Index<T> {
    fn new(raw: usize) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Position of the value in allocation order.
    pub fn get(self) -> usize {
        self.raw
    }
}

// Manual impls: derives would require `T: Clone` etc.
impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Index<T> {}

impl<T> std::hash::Hash for Index<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> PartialOrd for Index<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Index<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index({})", self.raw)
    }
}

pub struct Arena<T> {
    values: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            values: Vec::with_capacity(cap),
        }
    }

    pub fn allocate(&mut self, value: T) -> Index<T> {
        let raw = self.values.len();
        self.values.push(value);
        Index::new(raw)
    }

    pub fn get(&self, id: Index<T>) -> Option<&T> {
        self.values.get(id.get())
    }

    pub fn get_mut(&mut self, id: Index<T>) -> Option<&mut T> {
        self.values.get_mut(id.get())
    }

    pub fn contains(&self, id: Index<T>) -> bool {
        id.get() < self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Index<T>, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| (Index::new(i), value))
    }
}

impl<T> std::ops::Index<Index<T>> for Arena<T> {
    type Output = T;

    fn index(&self, id: Index<T>) -> &T {
        &self.values[id.get()]
    }
}

impl<T> std::ops::IndexMut<Index<T>> for Arena<T> {
    fn index_mut(&mut self, id: Index<T>) -> &mut T {
        &mut self.values[id.get()]
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}
