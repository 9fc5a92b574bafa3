// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop bags passed to components at instantiation time.
//!
//! [`Props`] maps prop names to [`PropValue`]s. Two names are reserved:
//!
//! - [`STYLE_PROP`] holds a [`PropValue::Style`].
//! - [`OVERRIDES_PROP`] holds a [`PropValue::Overrides`], the override tree a
//!   consumer hands to a component built with
//!   [`with_overrides`](crate::with_overrides).

use alloc::rc::Rc;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use crate::component::Component;
use crate::entries::Entries;
use crate::style::Style;
use crate::tree::Overrides;

/// Name of the style prop.
pub const STYLE_PROP: &str = "style";

/// Name of the prop carrying an override tree.
pub const OVERRIDES_PROP: &str = "overrides";

/// A single prop value.
pub enum PropValue<N> {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(Rc<str>),
    /// A style map; expected under [`STYLE_PROP`].
    Style(Style),
    /// A component reference, e.g. a render slot.
    Component(Component<N>),
    /// An override tree for a nested overridable component.
    Overrides(Overrides<N>),
    /// Any other host value (callbacks, handles). Compared by identity.
    Opaque(Rc<dyn Any>),
}

impl<N> PropValue<N> {
    /// Wraps an arbitrary host value.
    pub fn opaque<T: 'static>(value: T) -> Self {
        Self::Opaque(Rc::new(value))
    }

    /// Returns the flag, if this is a [`PropValue::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`PropValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float, if this is a [`PropValue::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is a [`PropValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the style, if this is a [`PropValue::Style`].
    #[must_use]
    pub fn as_style(&self) -> Option<&Style> {
        match self {
            Self::Style(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the component, if this is a [`PropValue::Component`].
    #[must_use]
    pub fn as_component(&self) -> Option<&Component<N>> {
        match self {
            Self::Component(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the override tree, if this is a [`PropValue::Overrides`].
    #[must_use]
    pub fn as_overrides(&self) -> Option<&Overrides<N>> {
        match self {
            Self::Overrides(value) => Some(value),
            _ => None,
        }
    }

    /// Downcasts an opaque value.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Opaque(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl<N> Clone for PropValue<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Bool(value) => Self::Bool(*value),
            Self::Int(value) => Self::Int(*value),
            Self::Float(value) => Self::Float(*value),
            Self::Str(value) => Self::Str(Rc::clone(value)),
            Self::Style(value) => Self::Style(value.clone()),
            Self::Component(value) => Self::Component(value.clone()),
            Self::Overrides(value) => Self::Overrides(value.clone()),
            Self::Opaque(value) => Self::Opaque(Rc::clone(value)),
        }
    }
}

impl<N> PartialEq for PropValue<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Component(a), Self::Component(b)) => a.ptr_eq(b),
            (Self::Overrides(a), Self::Overrides(b)) => a.ptr_eq(b),
            (Self::Opaque(a), Self::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<N> fmt::Debug for PropValue<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
            Self::Style(value) => f.debug_tuple("Style").field(value).finish(),
            Self::Component(value) => f.debug_tuple("Component").field(value).finish(),
            Self::Overrides(value) => f.debug_tuple("Overrides").field(value).finish(),
            Self::Opaque(_) => f.debug_tuple("Opaque").finish_non_exhaustive(),
        }
    }
}

impl<N> From<bool> for PropValue<N> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<N> From<i32> for PropValue<N> {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl<N> From<i64> for PropValue<N> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl<N> From<f64> for PropValue<N> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<N> From<&str> for PropValue<N> {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl<N> From<String> for PropValue<N> {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl<N> From<Style> for PropValue<N> {
    fn from(value: Style) -> Self {
        Self::Style(value)
    }
}

impl<N> From<Component<N>> for PropValue<N> {
    fn from(value: Component<N>) -> Self {
        Self::Component(value)
    }
}

impl<N> From<Overrides<N>> for PropValue<N> {
    fn from(value: Overrides<N>) -> Self {
        Self::Overrides(value)
    }
}

/// A shared bag of props.
///
/// Like [`Style`], `Props` wraps an `Rc`: forwarding props unchanged is a
/// reference-count bump, and mutation copies only when the storage is shared.
///
/// # Example
///
/// ```rust
/// use understory_override::{Props, Style};
///
/// let props: Props<()> = Props::new()
///     .with("isOpen", true)
///     .with("style", Style::new().with("color", "blue"));
///
/// assert_eq!(props.get_bool("isOpen"), Some(true));
/// assert_eq!(props.style().and_then(|s| s.get("color")).and_then(|c| c.as_str()), Some("blue"));
/// ```
pub struct Props<N> {
    inner: Rc<Entries<PropValue<N>>>,
}

impl<N> Props<N> {
    /// Creates an empty prop bag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Entries::new()),
        }
    }

    /// Returns `true` if no props are set.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of props set.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets a prop by name.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropValue<N>> {
        self.inner.get(name)
    }

    /// Returns `true` if `name` is set.
    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// Gets a flag prop.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    /// Gets an integer prop.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }

    /// Gets a string prop.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    /// Returns the [`STYLE_PROP`] value if it holds a [`Style`].
    #[must_use]
    pub fn style(&self) -> Option<&Style> {
        self.get(STYLE_PROP).and_then(PropValue::as_style)
    }

    /// Returns the [`OVERRIDES_PROP`] value if it holds an override tree.
    #[must_use]
    pub fn overrides(&self) -> Option<&Overrides<N>> {
        self.get(OVERRIDES_PROP).and_then(PropValue::as_overrides)
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<N>)> {
        self.inner.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Sets a prop, replacing any previous value.
    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue<N>>) {
        Rc::make_mut(&mut self.inner).insert(name.into(), value.into());
    }

    /// Builder form of [`Props::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue<N>>) -> Self {
        self.set(name, value);
        self
    }

    /// Removes a prop, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<PropValue<N>> {
        if !self.inner.contains(name) {
            return None;
        }
        Rc::make_mut(&mut self.inner).remove(name)
    }

    /// Shallow-merges `top` over `self`; props in `top` win.
    #[must_use]
    pub fn overlay(&self, top: &Self) -> Self {
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

    /// Returns `true` if both bags share the same storage.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Default for Props<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for Props<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> PartialEq for Props<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner == other.inner
    }
}

impl<N> fmt::Debug for Props<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<N, K, V> FromIterator<(K, V)> for Props<N>
where
    K: Into<Rc<str>>,
    V: Into<PropValue<N>>,
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
