// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorted, name-keyed storage shared by every map in this crate.

use alloc::rc::Rc;
use smallvec::SmallVec;

/// Default inline capacity for named entries.
///
/// Prop bags and sub-component namespaces rarely exceed a handful of names.
const INLINE_CAPACITY: usize = 8;

/// A small map from names to values, sorted by name for binary search.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Entries<V> {
    items: SmallVec<[(Rc<str>, V); INLINE_CAPACITY]>,
}

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Entries<V> {
    pub(crate) fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: SmallVec::with_capacity(capacity),
        }
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.items.binary_search_by(|(key, _)| key.as_ref().cmp(name))
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&V> {
        self.position(name).ok().map(|idx| &self.items[idx].1)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_ok()
    }

    /// Inserts or replaces, returning the previous value.
    pub(crate) fn insert(&mut self, name: Rc<str>, value: V) -> Option<V> {
        match self.position(&name) {
            Ok(idx) => Some(core::mem::replace(&mut self.items[idx].1, value)),
            Err(idx) => {
                self.items.insert(idx, (name, value));
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<V> {
        self.position(name)
            .ok()
            .map(|idx| self.items.remove(idx).1)
    }

    /// Appends an entry whose name sorts after every existing name.
    ///
    /// Used when rebuilding a map by walking another map in order.
    pub(crate) fn push_sorted(&mut self, name: Rc<str>, value: V) {
        debug_assert!(
            self.items.last().is_none_or(|(last, _)| **last < *name),
            "entries must be pushed in strictly ascending name order"
        );
        self.items.push((name, value));
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &V)> {
        self.items.iter().map(|(name, value)| (name, value))
    }

    /// Returns `true` if both maps hold exactly the same names.
    pub(crate) fn same_names<W>(&self, other: &Entries<W>) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|((a, _), (b, _))| a == b)
    }
}

impl<V: Clone> Entries<V> {
    /// Copies every entry of `top` into `self`; `top` wins on shared names.
    pub(crate) fn overlay(&mut self, top: &Self) {
        for (name, value) in top.iter() {
            self.insert(Rc::clone(name), value.clone());
        }
    }
}
