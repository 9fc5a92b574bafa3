// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default, override and resolved component trees.
//!
//! All three trees share one shape: a name maps either to a leaf or to a
//! nested namespace of the same tree type. Namespaces let a component expose
//! the overridable parts of its own sub-components (`list.item.label`).

use alloc::rc::Rc;
use core::fmt;

use crate::component::Component;
use crate::descriptor::ComponentOverride;
use crate::entries::Entries;
use crate::props::Props;

/// A node of a [`Defaults`] tree.
pub enum DefaultNode<N> {
    /// A default sub-component.
    Leaf(Component<N>),
    /// A namespace of further defaults.
    Namespace(Defaults<N>),
}

impl<N> Clone for DefaultNode<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(component) => Self::Leaf(component.clone()),
            Self::Namespace(defaults) => Self::Namespace(defaults.clone()),
        }
    }
}

impl<N> fmt::Debug for DefaultNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(component) => f.debug_tuple("Leaf").field(component).finish(),
            Self::Namespace(defaults) => f.debug_tuple("Namespace").field(defaults).finish(),
        }
    }
}

/// The author-declared default sub-components of an overridable component.
///
/// Only names declared here can be overridden.
///
/// # Example
///
/// ```rust
/// use understory_override::{Component, Defaults, Props};
///
/// let root: Component<String> = Component::named("Root", |_: &Props<String>| "root".into());
/// let label: Component<String> = Component::named("Label", |_: &Props<String>| "label".into());
///
/// let defaults = Defaults::new()
///     .with_component("Root", root)
///     .with_namespace("Item", Defaults::new().with_component("Label", label));
///
/// assert_eq!(defaults.len(), 2);
/// assert!(defaults.component("Root").is_some());
/// assert!(defaults.namespace("Item").is_some());
/// ```
pub struct Defaults<N> {
    inner: Rc<Entries<DefaultNode<N>>>,
}

impl<N> Defaults<N> {
    /// Creates an empty defaults map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Entries::new()),
        }
    }

    /// Declares a default sub-component.
    #[must_use]
    pub fn with_component(self, name: impl Into<Rc<str>>, component: Component<N>) -> Self {
        self.with_node(name, DefaultNode::Leaf(component))
    }

    /// Declares a nested namespace.
    #[must_use]
    pub fn with_namespace(self, name: impl Into<Rc<str>>, defaults: Self) -> Self {
        self.with_node(name, DefaultNode::Namespace(defaults))
    }

    /// Declares a node, replacing any node previously declared under `name`.
    #[must_use]
    pub fn with_node(mut self, name: impl Into<Rc<str>>, node: DefaultNode<N>) -> Self {
        Rc::make_mut(&mut self.inner).insert(name.into(), node);
        self
    }

    /// Returns the number of declared names.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the node declared under `name`.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&DefaultNode<N>> {
        self.inner.get(name)
    }

    /// Gets the default component declared under `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component<N>> {
        match self.get(name)? {
            DefaultNode::Leaf(component) => Some(component),
            DefaultNode::Namespace(_) => None,
        }
    }

    /// Gets the namespace declared under `name`.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Self> {
        match self.get(name)? {
            DefaultNode::Namespace(defaults) => Some(defaults),
            DefaultNode::Leaf(_) => None,
        }
    }

    /// Iterates `(name, node)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefaultNode<N>)> {
        self.inner.iter().map(|(name, node)| (name.as_ref(), node))
    }

    pub(crate) fn entries(&self) -> &Entries<DefaultNode<N>> {
        &self.inner
    }

    /// Returns `true` if both maps share the same storage.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Default for Defaults<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for Defaults<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> fmt::Debug for Defaults<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A node of an [`Overrides`] tree.
pub enum OverrideNode<N> {
    /// An override for one sub-component.
    Entry(ComponentOverride<N>),
    /// Overrides for a nested namespace.
    Namespace(Overrides<N>),
}

impl<N> OverrideNode<N> {
    /// Returns `true` if both nodes are the same value by identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Entry(a), Self::Entry(b)) => a.ptr_eq(b),
            (Self::Namespace(a), Self::Namespace(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<N> Clone for OverrideNode<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Entry(entry) => Self::Entry(entry.clone()),
            Self::Namespace(overrides) => Self::Namespace(overrides.clone()),
        }
    }
}

impl<N> fmt::Debug for OverrideNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(entry) => f.debug_tuple("Entry").field(entry).finish(),
            Self::Namespace(overrides) => f.debug_tuple("Namespace").field(overrides).finish(),
        }
    }
}

/// A consumer-authored, partial override tree.
///
/// Override trees are cheap to rebuild every render. The binder only needs
/// the *entries* to keep their identity between renders to reuse work, see
/// [`MemoPolicy`](crate::MemoPolicy).
///
/// # Example
///
/// ```rust
/// use understory_override::{Component, OverrideRecord, Overrides, Props, Style};
///
/// let fancy: Component<String> = Component::new(|_: &Props<String>| "fancy".into());
///
/// let overrides = Overrides::new()
///     .with("Root", fancy)
///     .with_namespace(
///         "Item",
///         Overrides::new().with(
///             "Label",
///             OverrideRecord::builder().style(Style::new().with("color", "red")),
///         ),
///     );
///
/// assert_eq!(overrides.len(), 2);
/// ```
pub struct Overrides<N> {
    inner: Rc<Entries<OverrideNode<N>>>,
}

impl<N> Overrides<N> {
    /// Creates an empty override tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Entries::new()),
        }
    }

    /// Overrides one sub-component.
    ///
    /// Accepts a [`Component`] (shorthand replacement), an
    /// [`OverrideRecord`](crate::OverrideRecord) or its builder.
    #[must_use]
    pub fn with(self, name: impl Into<Rc<str>>, entry: impl Into<ComponentOverride<N>>) -> Self {
        self.with_node(name, OverrideNode::Entry(entry.into()))
    }

    /// Overrides parts of a nested namespace.
    #[must_use]
    pub fn with_namespace(self, name: impl Into<Rc<str>>, overrides: Self) -> Self {
        self.with_node(name, OverrideNode::Namespace(overrides))
    }

    /// Sets a node, replacing any node previously set under `name`.
    #[must_use]
    pub fn with_node(mut self, name: impl Into<Rc<str>>, node: OverrideNode<N>) -> Self {
        Rc::make_mut(&mut self.inner).insert(name.into(), node);
        self
    }

    /// Returns the number of overridden names.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing is overridden.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the node set under `name`.
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&OverrideNode<N>> {
        self.inner.get(name)
    }

    /// Iterates `(name, node)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverrideNode<N>)> {
        self.inner.iter().map(|(name, node)| (name.as_ref(), node))
    }

    pub(crate) fn entries(&self) -> &Entries<OverrideNode<N>> {
        &self.inner
    }

    pub(crate) fn from_entries(entries: Entries<OverrideNode<N>>) -> Self {
        Self {
            inner: Rc::new(entries),
        }
    }

    /// Returns `true` if both trees share the same storage.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Shallow equality: same top-level names, identical node at each name.
    ///
    /// Nodes are compared by identity, not structure, the same way a
    /// reconciler compares props.
    #[must_use]
    pub fn shallow_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.same_names(&other.inner)
                && self
                    .inner
                    .iter()
                    .zip(other.inner.iter())
                    .all(|((_, a), (_, b))| a.ptr_eq(b)))
    }
}

impl<N> Default for Overrides<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for Overrides<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> fmt::Debug for Overrides<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A node of a [`Resolved`] tree.
pub enum ResolvedNode<N> {
    /// A ready-to-instantiate component.
    Component(Component<N>),
    /// A resolved nested namespace.
    Namespace(Resolved<N>),
}

impl<N> ResolvedNode<N> {
    /// Returns `true` if both nodes are the same value by identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => a.ptr_eq(b),
            (Self::Namespace(a), Self::Namespace(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<N> Clone for ResolvedNode<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Component(component) => Self::Component(component.clone()),
            Self::Namespace(resolved) => Self::Namespace(resolved.clone()),
        }
    }
}

impl<N> fmt::Debug for ResolvedNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(component) => f.debug_tuple("Component").field(component).finish(),
            Self::Namespace(resolved) => f.debug_tuple("Namespace").field(resolved).finish(),
        }
    }
}

/// The result of resolving overrides against defaults.
///
/// Mirrors the [`Defaults`] it was resolved from: same names, same
/// namespaces, nothing else.
pub struct Resolved<N> {
    inner: Rc<Entries<ResolvedNode<N>>>,
}

impl<N> Resolved<N> {
    pub(crate) fn from_entries(entries: Entries<ResolvedNode<N>>) -> Self {
        Self {
            inner: Rc::new(entries),
        }
    }

    /// Returns the number of resolved names.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing was resolved.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Gets the resolved node under `name`.
    #[must_use]
    #[inline]
    pub fn node(&self, name: &str) -> Option<&ResolvedNode<N>> {
        self.inner.get(name)
    }

    /// Gets the resolved component under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Component<N>> {
        match self.node(name)? {
            ResolvedNode::Component(component) => Some(component),
            ResolvedNode::Namespace(_) => None,
        }
    }

    /// Gets the resolved namespace under `name`.
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Self> {
        match self.node(name)? {
            ResolvedNode::Namespace(resolved) => Some(resolved),
            ResolvedNode::Component(_) => None,
        }
    }

    /// Follows `path` through namespaces to a component.
    ///
    /// ```rust
    /// use understory_override::{Component, Defaults, Props, resolve};
    ///
    /// let label: Component<String> = Component::new(|_: &Props<String>| "label".into());
    /// let defaults =
    ///     Defaults::new().with_namespace("Item", Defaults::new().with_component("Label", label));
    ///
    /// let resolved = resolve(&defaults, None).unwrap();
    /// let found = resolved.lookup(&["Item", "Label"]).unwrap();
    /// assert_eq!(found.render(&Props::new()), "label");
    /// assert!(resolved.lookup(&["Item"]).is_none());
    /// ```
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<&Component<N>> {
        let (last, namespaces) = path.split_last()?;
        let mut current = self;
        for name in namespaces {
            current = current.namespace(name)?;
        }
        current.get(last)
    }

    /// Instantiates the component under `name`, if there is one.
    pub fn render(&self, name: &str, props: &Props<N>) -> Option<N> {
        self.get(name).map(|component| component.render(props))
    }

    /// Iterates `(name, node)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedNode<N>)> {
        self.inner.iter().map(|(name, node)| (name.as_ref(), node))
    }

    /// Returns `true` if both maps are the same resolution result.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Clone for Resolved<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> fmt::Debug for Resolved<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
