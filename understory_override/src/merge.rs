// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition of override trees.
//!
//! A themed library often layers overrides: a theme-wide tree, then the
//! per-instance tree a consumer passes. [`merge_overrides`] folds two such
//! trees into one, so the result can be handed to a binder as a single
//! input.

use alloc::rc::Rc;

use crate::descriptor::{ComponentOverride, OverrideRecord, StyleOverride};
use crate::props::{OVERRIDES_PROP, PropValue, Props, STYLE_PROP};
use crate::tree::{OverrideNode, Overrides};

/// Deep-merges `top` over `base`.
///
/// - Names present in only one tree are kept as they are.
/// - Two namespaces merge recursively.
/// - A shorthand on top replaces whatever `base` had.
/// - A record on top of a shorthand keeps the shorthand as its component
///   unless the record names its own.
/// - Two records merge field by field: `top`'s component wins, styles merge
///   shallowly (dynamic styles are evaluated and merged per instantiation),
///   props merge shallowly with `top` winning, except that `style` props
///   merge as styles and nested `overrides` props merge as override trees.
/// - Any other combination keeps `top`'s node.
///
/// If either tree is empty the other is returned unchanged, preserving its
/// identity for the binder.
///
/// # Example
///
/// ```rust
/// use understory_override::{OverrideNode, OverrideRecord, Overrides, Props, Style, merge_overrides};
///
/// let theme: Overrides<String> = Overrides::new().with(
///     "Label",
///     OverrideRecord::builder().style(Style::new().with("color", "gray").with("margin", 2)),
/// );
/// let local = Overrides::new().with(
///     "Label",
///     OverrideRecord::builder()
///         .style(Style::new().with("color", "red"))
///         .props(Props::new().with("title", "Hi")),
/// );
///
/// let merged = merge_overrides(&theme, &local);
/// let Some(OverrideNode::Entry(entry)) = merged.get("Label") else { panic!() };
/// let understory_override::ComponentOverride::Customize(record) = entry else { panic!() };
/// let style = record.style().unwrap().evaluate(&Props::new());
/// assert_eq!(style, Style::new().with("color", "red").with("margin", 2));
/// assert_eq!(record.props().and_then(|p| p.get_str("title")), Some("Hi"));
/// ```
#[must_use]
pub fn merge_overrides<N: 'static>(base: &Overrides<N>, top: &Overrides<N>) -> Overrides<N> {
    if top.is_empty() {
        return base.clone();
    }
    if base.is_empty() {
        return top.clone();
    }
    let mut entries = base.entries().clone();
    for (name, top_node) in top.entries().iter() {
        let merged = match (entries.get(name), top_node) {
            (Some(OverrideNode::Namespace(below)), OverrideNode::Namespace(above)) => {
                OverrideNode::Namespace(merge_overrides(below, above))
            }
            (Some(OverrideNode::Entry(below)), OverrideNode::Entry(above)) => {
                OverrideNode::Entry(merge_entries(below, above))
            }
            _ => top_node.clone(),
        };
        entries.insert(Rc::clone(name), merged);
    }
    Overrides::from_entries(entries)
}

fn merge_entries<N: 'static>(
    base: &ComponentOverride<N>,
    top: &ComponentOverride<N>,
) -> ComponentOverride<N> {
    match (base, top) {
        (_, ComponentOverride::Replace(_)) => top.clone(),
        (ComponentOverride::Replace(component), ComponentOverride::Customize(record)) => {
            if record.component().is_some() {
                top.clone()
            } else {
                ComponentOverride::Customize(
                    record.to_builder().component(component.clone()).build(),
                )
            }
        }
        (ComponentOverride::Customize(below), ComponentOverride::Customize(above)) => {
            ComponentOverride::Customize(merge_records(below, above))
        }
    }
}

fn merge_records<N: 'static>(base: &OverrideRecord<N>, top: &OverrideRecord<N>) -> OverrideRecord<N> {
    if base.is_empty() {
        return top.clone();
    }
    if top.is_empty() {
        return base.clone();
    }
    let mut builder = OverrideRecord::builder();
    if let Some(component) = top.component().or(base.component()) {
        builder = builder.component(component.clone());
    }
    if let Some(style) = merge_style_overrides(base.style(), top.style()) {
        builder = builder.style(style);
    }
    if let Some(props) = merge_props(base.props(), top.props()) {
        builder = builder.props(props);
    }
    builder.build()
}

fn merge_style_overrides<N: 'static>(
    base: Option<&StyleOverride<N>>,
    top: Option<&StyleOverride<N>>,
) -> Option<StyleOverride<N>> {
    match (base, top) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(StyleOverride::Static(below)), Some(StyleOverride::Static(above))) => {
            Some(StyleOverride::Static(below.merged_with(above)))
        }
        (Some(below), Some(above)) => {
            let below = below.clone();
            let above = above.clone();
            Some(StyleOverride::dynamic(move |props| {
                below.evaluate(props).merged_with(&above.evaluate(props))
            }))
        }
    }
}

fn merge_props<N: 'static>(base: Option<&Props<N>>, top: Option<&Props<N>>) -> Option<Props<N>> {
    let (base, top) = match (base, top) {
        (None, None) => return None,
        (Some(only), None) | (None, Some(only)) => return Some(only.clone()),
        (Some(base), Some(top)) => (base, top),
    };
    let mut merged = base.overlay(top);
    if let (Some(PropValue::Style(below)), Some(PropValue::Style(above))) =
        (base.get(STYLE_PROP), top.get(STYLE_PROP))
    {
        merged.set(STYLE_PROP, below.merged_with(above));
    }
    if let (Some(PropValue::Overrides(below)), Some(PropValue::Overrides(above))) =
        (base.get(OVERRIDES_PROP), top.get(OVERRIDES_PROP))
    {
        merged.set(OVERRIDES_PROP, merge_overrides(below, above));
    }
    Some(merged)
}
