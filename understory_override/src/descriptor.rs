// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Override entries for a single sub-component.
//!
//! An entry is either a shorthand replacement ([`ComponentOverride::Replace`])
//! or a record ([`ComponentOverride::Customize`]) that may swap the
//! component, restyle it, and inject props. The variant is fixed when the
//! entry is built; resolution never probes values to guess it.

use alloc::rc::Rc;
use core::fmt;

use crate::component::Component;
use crate::props::Props;
use crate::style::Style;

/// Style part of an [`OverrideRecord`].
pub enum StyleOverride<N> {
    /// A fixed style.
    Static(Style),
    /// A style computed from the props the component is instantiated with.
    Dynamic(Rc<dyn Fn(&Props<N>) -> Style>),
}

impl<N> StyleOverride<N> {
    /// Creates a dynamic style override.
    pub fn dynamic(style: impl Fn(&Props<N>) -> Style + 'static) -> Self {
        Self::Dynamic(Rc::new(style))
    }

    /// Produces the style for one instantiation.
    ///
    /// Static styles are returned as-is. Dynamic styles are called with
    /// `props`; anything they panic with propagates to the caller.
    #[must_use]
    pub fn evaluate(&self, props: &Props<N>) -> Style {
        match self {
            Self::Static(style) => style.clone(),
            Self::Dynamic(style) => style(props),
        }
    }

    /// Returns `true` if both overrides are the same value by identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) => a.ptr_eq(b),
            (Self::Dynamic(a), Self::Dynamic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<N> Clone for StyleOverride<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(style) => Self::Static(style.clone()),
            Self::Dynamic(style) => Self::Dynamic(Rc::clone(style)),
        }
    }
}

impl<N> fmt::Debug for StyleOverride<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(style) => f.debug_tuple("Static").field(style).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").finish_non_exhaustive(),
        }
    }
}

impl<N> From<Style> for StyleOverride<N> {
    fn from(style: Style) -> Self {
        Self::Static(style)
    }
}

/// The record form of an override entry.
///
/// Every field is optional. An empty record is legal and leaves the default
/// component untouched (it is still wrapped).
///
/// Records are `Rc`-shared: an entry cloned into a fresh override tree keeps
/// its identity, which is what the binder's shallow comparison looks at.
///
/// # Example
///
/// ```rust
/// use understory_override::{OverrideRecord, Props, Style};
///
/// let record: OverrideRecord<String> = OverrideRecord::builder()
///     .style(Style::new().with("color", "red"))
///     .props(Props::new().with("title", "Close"))
///     .build();
///
/// assert!(record.component().is_none());
/// assert_eq!(record.props().and_then(|p| p.get_str("title")), Some("Close"));
/// ```
pub struct OverrideRecord<N> {
    inner: Rc<RecordData<N>>,
}

struct RecordData<N> {
    component: Option<Component<N>>,
    style: Option<StyleOverride<N>>,
    props: Option<Props<N>>,
}

impl<N> OverrideRecord<N> {
    /// Starts building a record.
    #[must_use]
    pub fn builder() -> OverrideRecordBuilder<N> {
        OverrideRecordBuilder::new()
    }

    /// The replacement component, if any.
    #[must_use]
    #[inline]
    pub fn component(&self) -> Option<&Component<N>> {
        self.inner.component.as_ref()
    }

    /// The style override, if any.
    #[must_use]
    #[inline]
    pub fn style(&self) -> Option<&StyleOverride<N>> {
        self.inner.style.as_ref()
    }

    /// The injected props, if any.
    #[must_use]
    #[inline]
    pub fn props(&self) -> Option<&Props<N>> {
        self.inner.props.as_ref()
    }

    /// Returns `true` if the record sets nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.component.is_none() && self.inner.style.is_none() && self.inner.props.is_none()
    }

    /// Returns `true` if both handles refer to the same record.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reopens this record as a builder seeded with its fields.
    #[must_use]
    pub fn to_builder(&self) -> OverrideRecordBuilder<N> {
        OverrideRecordBuilder {
            component: self.inner.component.clone(),
            style: self.inner.style.clone(),
            props: self.inner.props.clone(),
        }
    }
}

impl<N> Clone for OverrideRecord<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> Default for OverrideRecord<N> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<N> fmt::Debug for OverrideRecord<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRecord")
            .field("component", &self.inner.component)
            .field("style", &self.inner.style)
            .field("props", &self.inner.props)
            .finish()
    }
}

/// Builder for [`OverrideRecord`].
pub struct OverrideRecordBuilder<N> {
    component: Option<Component<N>>,
    style: Option<StyleOverride<N>>,
    props: Option<Props<N>>,
}

impl<N> OverrideRecordBuilder<N> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            component: None,
            style: None,
            props: None,
        }
    }

    /// Replaces the underlying component while keeping style/prop merging.
    #[must_use]
    pub fn component(mut self, component: Component<N>) -> Self {
        self.component = Some(component);
        self
    }

    /// Sets a static or dynamic style override.
    #[must_use]
    pub fn style(mut self, style: impl Into<StyleOverride<N>>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Sets a style computed from the instantiation props.
    #[must_use]
    pub fn style_fn(mut self, style: impl Fn(&Props<N>) -> Style + 'static) -> Self {
        self.style = Some(StyleOverride::dynamic(style));
        self
    }

    /// Sets props injected over the incoming props.
    #[must_use]
    pub fn props(mut self, props: Props<N>) -> Self {
        self.props = Some(props);
        self
    }

    /// Builds the record.
    #[must_use]
    pub fn build(self) -> OverrideRecord<N> {
        OverrideRecord {
            inner: Rc::new(RecordData {
                component: self.component,
                style: self.style,
                props: self.props,
            }),
        }
    }
}

impl<N> Default for OverrideRecordBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for OverrideRecordBuilder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRecordBuilder")
            .field("component", &self.component)
            .field("style", &self.style)
            .field("props", &self.props)
            .finish()
    }
}

/// One override entry: a shorthand replacement or a record.
pub enum ComponentOverride<N> {
    /// Full replacement. The component is used as-is, without wrapping or
    /// merging.
    Replace(Component<N>),
    /// Component swap, style and props merged at instantiation time.
    Customize(OverrideRecord<N>),
}

impl<N> ComponentOverride<N> {
    /// Shorthand constructor for [`ComponentOverride::Replace`].
    #[must_use]
    pub fn replace(component: Component<N>) -> Self {
        Self::Replace(component)
    }

    /// Constructor for [`ComponentOverride::Customize`].
    #[must_use]
    pub fn customize(record: OverrideRecord<N>) -> Self {
        Self::Customize(record)
    }

    /// Returns `true` if both entries are the same value by identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Replace(a), Self::Replace(b)) => a.ptr_eq(b),
            (Self::Customize(a), Self::Customize(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<N> Clone for ComponentOverride<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Replace(component) => Self::Replace(component.clone()),
            Self::Customize(record) => Self::Customize(record.clone()),
        }
    }
}

impl<N> fmt::Debug for ComponentOverride<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(component) => f.debug_tuple("Replace").field(component).finish(),
            Self::Customize(record) => f.debug_tuple("Customize").field(record).finish(),
        }
    }
}

impl<N> From<Component<N>> for ComponentOverride<N> {
    fn from(component: Component<N>) -> Self {
        Self::Replace(component)
    }
}

impl<N> From<OverrideRecord<N>> for ComponentOverride<N> {
    fn from(record: OverrideRecord<N>) -> Self {
        Self::Customize(record)
    }
}

impl<N> From<OverrideRecordBuilder<N>> for ComponentOverride<N> {
    fn from(builder: OverrideRecordBuilder<N>) -> Self {
        Self::Customize(builder.build())
    }
}
