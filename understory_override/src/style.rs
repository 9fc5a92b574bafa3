// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style maps and shallow style merging.
//!
//! A [`Style`] is a flat map from style names (`"color"`, `"margin"`) to
//! [`StyleValue`]s. Merging is always shallow: when two styles are combined,
//! the later one wins per name and nothing nests.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::entries::Entries;

/// A single style value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// A flag, e.g. `"wrap": true`.
    Bool(bool),
    /// An integer, e.g. `"margin": 4`.
    Int(i64),
    /// A float, e.g. `"opacity": 0.5`.
    Float(f64),
    /// A string, e.g. `"color": "red"`.
    Str(Rc<str>),
}

impl StyleValue {
    /// Returns the string payload, if this is a [`StyleValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

/// A shared, shallow style map.
///
/// `Style` wraps an `Rc`, so cloning only bumps a reference count. Mutating
/// methods copy the entries first if they are shared.
///
/// # Example
///
/// ```rust
/// use understory_override::{Style, StyleValue};
///
/// let base = Style::new().with("color", "blue").with("margin", 1);
/// let top = Style::new().with("color", "red");
///
/// let merged = base.merged_with(&top);
/// assert_eq!(merged.get("color"), Some(&StyleValue::from("red")));
/// assert_eq!(merged.get("margin"), Some(&StyleValue::Int(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Style {
    inner: Rc<Entries<StyleValue>>,
}

impl Style {
    /// Creates an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no style names are set.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of style names set.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value for a style name.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.inner.get(name)
    }

    /// Returns `true` if the style sets `name`.
    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.inner.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Sets a style value, replacing any previous value for `name`.
    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<StyleValue>) {
        Rc::make_mut(&mut self.inner).insert(name.into(), value.into());
    }

    /// Builder form of [`Style::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Removes a style name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<StyleValue> {
        if !self.inner.contains(name) {
            return None;
        }
        Rc::make_mut(&mut self.inner).remove(name)
    }

    /// Shallow-merges `top` over `self`; names in `top` win.
    ///
    /// If either side is empty the other is returned as-is, sharing its
    /// storage.
    #[must_use]
    pub fn merged_with(&self, top: &Self) -> Self {
        if top.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return top.clone();
        }
        let mut entries = (*self.inner).clone();
        entries.overlay(&top.inner);
        Self {
            inner: Rc::new(entries),
        }
    }

    /// Returns `true` if both styles share the same storage.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner == other.inner
    }
}

impl<K, V> FromIterator<(K, V)> for Style
where
    K: Into<Rc<str>>,
    V: Into<StyleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (name, value) in iter {
            entries.insert(name.into(), value.into());
        }
        Self {
            inner: Rc::new(entries),
        }
    }
}

/// Shallow-merges style layers from lowest to highest precedence.
///
/// Missing layers are skipped. Returns `None` when every layer is missing,
/// which callers use to omit the `style` prop entirely.
///
/// ```rust
/// use understory_override::{Style, merge_styles};
///
/// let incoming = Style::new().with("color", "blue").with("margin", 1);
/// let overridden = Style::new().with("color", "red");
///
/// let merged = merge_styles([Some(&incoming), None, Some(&overridden)]).unwrap();
/// assert_eq!(merged, Style::new().with("color", "red").with("margin", 1));
///
/// assert!(merge_styles([None, None]).is_none());
/// ```
pub fn merge_styles<'a>(layers: impl IntoIterator<Item = Option<&'a Style>>) -> Option<Style> {
    layers
        .into_iter()
        .flatten()
        .fold(None, |merged: Option<Style>, layer| {
            Some(match merged {
                Some(base) => base.merged_with(layer),
                None => layer.clone(),
            })
        })
}
