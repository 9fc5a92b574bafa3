// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderable component references.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::props::Props;

/// A renderable reference: something the host can instantiate with [`Props`].
///
/// `N` is the host's node type, whatever one instantiation produces. The
/// crate never inspects it.
///
/// Components are compared by identity, not by behavior. Two components are
/// equal only if they are clones of the same reference; this is the identity
/// the host's reconciler keys on and the one the binder keeps stable.
///
/// # Example
///
/// ```rust
/// use understory_override::{Component, Props};
///
/// let label = Component::named("Label", |props: &Props<String>| {
///     format!("<label>{}</label>", props.get_str("text").unwrap_or_default())
/// });
///
/// let same = label.clone();
/// assert_eq!(label, same);
/// assert_eq!(label.render(&Props::new().with("text", "Hi")), "<label>Hi</label>");
/// ```
pub struct Component<N> {
    inner: Rc<ComponentInner<N>>,
}

struct ComponentInner<N> {
    name: Option<Rc<str>>,
    render: Box<dyn Fn(&Props<N>) -> N>,
}

impl<N: 'static> Component<N> {
    /// Creates an anonymous component from a render function.
    pub fn new(render: impl Fn(&Props<N>) -> N + 'static) -> Self {
        Self::from_parts(None, render)
    }

    /// Creates a component with a debug name.
    pub fn named(name: impl Into<Rc<str>>, render: impl Fn(&Props<N>) -> N + 'static) -> Self {
        Self::from_parts(Some(name.into()), render)
    }

    pub(crate) fn from_parts(
        name: Option<Rc<str>>,
        render: impl Fn(&Props<N>) -> N + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(ComponentInner {
                name,
                render: Box::new(render),
            }),
        }
    }
}

impl<N> Component<N> {
    /// Instantiates the component with `props`.
    #[inline]
    pub fn render(&self, props: &Props<N>) -> N {
        (self.inner.render)(props)
    }

    /// Returns the debug name, if one was given.
    #[must_use]
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub(crate) fn name_rc(&self) -> Option<Rc<str>> {
        self.inner.name.clone()
    }

    /// Returns `true` if both handles refer to the same component.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Clone for Component<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> PartialEq for Component<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<N> Eq for Component<N> {}

impl<N> fmt::Debug for Component<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("ptr", &Rc::as_ptr(&self.inner))
            .finish()
    }
}
