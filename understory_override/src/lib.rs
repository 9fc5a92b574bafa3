// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Override: overridable sub-components with memoized resolution.
//!
//! A component author declares the sub-components a consumer may customize
//! as a [`Defaults`] tree. A consumer passes an [`Overrides`] tree that
//! replaces, restyles, or injects props into any of them. This crate merges
//! the two into a [`Resolved`] tree of ready-to-instantiate [`Component`]s
//! and keeps those components' identities stable across re-renders.
//!
//! The host rendering framework stays opaque: `N` is whatever a component
//! produces, and a [`Component<N>`] is just something that can be
//! instantiated with [`Props<N>`].
//!
//! ## Core Concepts
//!
//! ### Override entries
//!
//! Each name in an [`Overrides`] tree holds a [`ComponentOverride`]:
//!
//! - [`ComponentOverride::Replace`] (shorthand): the given component is used
//!   instead of the default, as-is.
//! - [`ComponentOverride::Customize`]: an [`OverrideRecord`] that may swap the
//!   component, add a static or props-dependent [`Style`], and inject props.
//!
//! Namespaces ([`OverrideNode::Namespace`]) reach into nested
//! sub-components to any depth.
//!
//! ### Resolution
//!
//! [`resolve`] is pure: every call builds new wrapper components. Style
//! merging is shallow and ordered: incoming `style`, then the record's
//! `props.style`, then the record's style override.
//!
//! ```rust
//! use understory_override::{
//!     Component, Defaults, OverrideRecord, Overrides, Props, Style, resolve,
//! };
//!
//! let label: Component<String> = Component::named("Label", |props: &Props<String>| {
//!     let style: Vec<String> = props
//!         .style()
//!         .map(|s| s.iter().map(|(k, v)| format!("{k}:{v}")).collect())
//!         .unwrap_or_default();
//!     format!("<span style=\"{}\">{}</span>", style.join(";"), props.get_str("text").unwrap_or(""))
//! });
//! let defaults = Defaults::new().with_component("Label", label);
//!
//! let overrides = Overrides::new().with(
//!     "Label",
//!     OverrideRecord::builder()
//!         .style_fn(|props: &Props<String>| {
//!             let color = if props.get_bool("active") == Some(true) { "green" } else { "red" };
//!             Style::new().with("color", color)
//!         })
//!         .props(Props::new().with("text", "Hello")),
//! );
//!
//! let resolved = resolve(&defaults, Some(&overrides)).unwrap();
//! let incoming = Props::new()
//!     .with("active", true)
//!     .with("style", Style::new().with("color", "blue").with("margin", 1));
//!
//! assert_eq!(
//!     resolved.render("Label", &incoming).unwrap(),
//!     "<span style=\"color:green;margin:1\">Hello</span>"
//! );
//! ```
//!
//! ### Binding
//!
//! Hosts do not call [`resolve`] per render. They bind instead:
//!
//! - [`with_overrides`] returns a new component reading its `overrides` prop.
//! - [`OverrideBinder`] and [`BindingCx`] return the resolved tree directly.
//!
//! All of them memoize (see [`MemoPolicy`]): while the override tree is
//! unchanged the exact same [`Resolved`] is returned, and when one entry
//! changes only that name gets a new component.
//!
//! ```rust
//! use understory_override::{Component, Defaults, OverrideBinder, OverrideRecord, Overrides, Props, Style};
//!
//! let leaf = |name: &'static str| -> Component<String> {
//!     Component::named(name, move |_: &Props<String>| name.into())
//! };
//! let mut binder = OverrideBinder::new(
//!     Defaults::new()
//!         .with_component("Header", leaf("header"))
//!         .with_component("Body", leaf("body")),
//! );
//!
//! let bold = OverrideRecord::builder()
//!     .style(Style::new().with("weight", "bold"))
//!     .build();
//!
//! // The consumer rebuilds its tree every render but reuses the entry.
//! let first = binder.bind(Some(&Overrides::new().with("Header", bold.clone()))).unwrap();
//! let second = binder.bind(Some(&Overrides::new().with("Header", bold))).unwrap();
//! assert!(first.ptr_eq(&second));
//!
//! // A new entry only invalidates its own name.
//! let italic = OverrideRecord::builder().style(Style::new().with("style", "italic"));
//! let third = binder.bind(Some(&Overrides::new().with("Header", italic))).unwrap();
//! assert!(third.get("Body").unwrap().ptr_eq(second.get("Body").unwrap()));
//! assert!(!third.get("Header").unwrap().ptr_eq(second.get("Header").unwrap()));
//! ```
//!
//! ## Errors
//!
//! Override names the defaults do not declare are ignored unless
//! [`UnknownTargetHandling`] says otherwise. Entries that do not fit the
//! defaults' shape fail with [`ErrorKind::MalformedOverrideEntry`].
//! Panics in dynamic style functions propagate unchanged.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod binder;
mod component;
mod descriptor;
mod entries;
mod error;
mod merge;
mod options;
mod props;
mod resolve;
mod style;
mod trace;
mod tree;

pub use binder::{BindingCx, MemoCache, OverrideBinder, with_overrides, with_overrides_options};
pub use component::Component;
pub use descriptor::{ComponentOverride, OverrideRecord, OverrideRecordBuilder, StyleOverride};
pub use error::{ErrorKind, Malformed, OverrideError, OverridePath};
pub use merge::merge_overrides;
pub use options::{MemoPolicy, ResolveOptions, UnknownTargetHandling};
pub use props::{OVERRIDES_PROP, PropValue, Props, STYLE_PROP};
pub use resolve::{resolve, resolve_with};
pub use style::{Style, StyleValue, merge_styles};
pub use trace::{Resolution, ResolveTrace, TraceRecorder};
pub use tree::{DefaultNode, Defaults, OverrideNode, Overrides, Resolved, ResolvedNode};
