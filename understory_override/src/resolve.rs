// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Override resolution.
//!
//! [`resolve`] walks the [`Defaults`] tree once and produces a [`Resolved`]
//! tree of the same shape. For each default component it picks one of three
//! outcomes:
//!
//! - **No override**: a pass-through wrapper around the default. Wrapping is
//!   unconditional so every resolved name is a fresh reference owned by this
//!   resolution pass.
//! - **Shorthand**: the replacement component itself, unwrapped.
//! - **Record**: a wrapper that merges component, style and props at
//!   instantiation time (see [`OverrideRecord`]).
//!
//! # Record precedence
//!
//! When a record-wrapped component is instantiated with incoming props `P`:
//!
//! 1. The rendered component is the record's component, or else the default.
//! 2. The effective style shallow-merges, from lowest to highest precedence,
//!    `P.style`, the record's `props.style`, and the record's style override.
//!    A dynamic style override is called with `P`. If none of these exist the
//!    `style` prop is omitted.
//! 3. The effective props are the record's props merged over `P` (record
//!    wins), with the effective style set last.

use alloc::rc::Rc;

use crate::component::Component;
use crate::descriptor::{ComponentOverride, OverrideRecord};
use crate::entries::Entries;
use crate::error::{Malformed, OverrideError, OverridePath};
use crate::options::{ResolveOptions, UnknownTargetHandling};
use crate::props::{PropValue, STYLE_PROP};
use crate::style::{Style, merge_styles};
use crate::trace::{Resolution, ResolveTrace};
use crate::tree::{DefaultNode, Defaults, OverrideNode, Overrides, Resolved, ResolvedNode};

/// Resolves `overrides` against `defaults` with default options.
///
/// Unknown override names are ignored. Malformed entries fail with
/// [`ErrorKind::MalformedOverrideEntry`](crate::ErrorKind::MalformedOverrideEntry).
///
/// # Example
///
/// ```rust
/// use understory_override::{Component, Defaults, OverrideRecord, Overrides, Props, Style, resolve};
///
/// let button: Component<String> = Component::named("Button", |props: &Props<String>| {
///     let color = props
///         .style()
///         .and_then(|s| s.get("color"))
///         .and_then(|c| c.as_str())
///         .unwrap_or("none");
///     format!("button[{color}]")
/// });
/// let defaults = Defaults::new().with_component("Button", button);
///
/// let overrides = Overrides::new().with(
///     "Button",
///     OverrideRecord::builder().style(Style::new().with("color", "red")),
/// );
///
/// let resolved = resolve(&defaults, Some(&overrides)).unwrap();
/// let html = resolved.render("Button", &Props::new()).unwrap();
/// assert_eq!(html, "button[red]");
/// ```
pub fn resolve<N: 'static>(
    defaults: &Defaults<N>,
    overrides: Option<&Overrides<N>>,
) -> Result<Resolved<N>, OverrideError> {
    resolve_with(defaults, overrides, &ResolveOptions::default(), &mut ())
}

/// Resolves `overrides` against `defaults`, reporting every decision to
/// `trace`.
pub fn resolve_with<N, T>(
    defaults: &Defaults<N>,
    overrides: Option<&Overrides<N>>,
    options: &ResolveOptions,
    trace: &mut T,
) -> Result<Resolved<N>, OverrideError>
where
    N: 'static,
    T: ResolveTrace + ?Sized,
{
    tracing::trace!(
        defaults = defaults.len(),
        overrides = overrides.map_or(0, Overrides::len),
        "resolving overrides"
    );
    resolve_namespace(
        defaults,
        overrides,
        &OverridePath::root(),
        None,
        options,
        trace,
    )
}

/// Result of an earlier pass over the same namespace.
///
/// Names whose override node is identical to the one in `overrides` keep
/// their node from `resolved`.
pub(crate) struct Reuse<'a, N> {
    pub(crate) overrides: Option<&'a Overrides<N>>,
    pub(crate) resolved: &'a Resolved<N>,
}

impl<N> Reuse<'_, N> {
    fn node(&self, name: &str, next: Option<&OverrideNode<N>>) -> Option<&ResolvedNode<N>> {
        let previous = self.overrides.and_then(|overrides| overrides.get(name));
        let unchanged = match (previous, next) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        if unchanged {
            self.resolved.node(name)
        } else {
            None
        }
    }
}

pub(crate) fn resolve_namespace<N, T>(
    defaults: &Defaults<N>,
    overrides: Option<&Overrides<N>>,
    path: &OverridePath,
    reuse: Option<&Reuse<'_, N>>,
    options: &ResolveOptions,
    trace: &mut T,
) -> Result<Resolved<N>, OverrideError>
where
    N: 'static,
    T: ResolveTrace + ?Sized,
{
    if let Some(overrides) = overrides {
        check_unknown_targets(defaults, overrides, path, options, trace)?;
    }

    let mut entries = Entries::with_capacity(defaults.len());
    for (name, default) in defaults.entries().iter() {
        let node = overrides.and_then(|overrides| overrides.get(name));
        let child = path.child(Rc::clone(name));
        let resolved = match reuse.and_then(|reuse| reuse.node(name, node)) {
            Some(previous) => {
                trace.resolved(&child, Resolution::Reused);
                previous.clone()
            }
            None => resolve_node(default, node, &child, options, trace)?,
        };
        entries.push_sorted(Rc::clone(name), resolved);
    }
    Ok(Resolved::from_entries(entries))
}

fn check_unknown_targets<N, T>(
    defaults: &Defaults<N>,
    overrides: &Overrides<N>,
    path: &OverridePath,
    options: &ResolveOptions,
    trace: &mut T,
) -> Result<(), OverrideError>
where
    T: ResolveTrace + ?Sized,
{
    for (name, _) in overrides.iter() {
        if defaults.get(name).is_some() {
            continue;
        }
        let unknown = path.child(name);
        trace.unknown_target(&unknown);
        match options.unknown_targets() {
            UnknownTargetHandling::Ignore => {}
            UnknownTargetHandling::Warn => {
                tracing::warn!(path = %unknown, "override names a component with no default");
            }
            UnknownTargetHandling::Error => return Err(OverrideError::unknown_target(unknown)),
        }
    }
    Ok(())
}

fn resolve_node<N, T>(
    default: &DefaultNode<N>,
    node: Option<&OverrideNode<N>>,
    path: &OverridePath,
    options: &ResolveOptions,
    trace: &mut T,
) -> Result<ResolvedNode<N>, OverrideError>
where
    N: 'static,
    T: ResolveTrace + ?Sized,
{
    let (resolved, resolution) = match (default, node) {
        (DefaultNode::Namespace(defaults), None) => (
            ResolvedNode::Namespace(resolve_namespace(defaults, None, path, None, options, trace)?),
            Resolution::Namespace,
        ),
        (DefaultNode::Namespace(defaults), Some(OverrideNode::Namespace(overrides))) => (
            ResolvedNode::Namespace(resolve_namespace(
                defaults,
                Some(overrides),
                path,
                None,
                options,
                trace,
            )?),
            Resolution::Namespace,
        ),
        (DefaultNode::Namespace(_), Some(OverrideNode::Entry(_))) => {
            return Err(OverrideError::malformed(
                path.clone(),
                Malformed::ExpectedNamespace,
            ));
        }
        (DefaultNode::Leaf(_), Some(OverrideNode::Namespace(_))) => {
            return Err(OverrideError::malformed(
                path.clone(),
                Malformed::ExpectedEntry,
            ));
        }
        (DefaultNode::Leaf(default), None) => (
            ResolvedNode::Component(passthrough(default)),
            Resolution::Passthrough,
        ),
        (DefaultNode::Leaf(_), Some(OverrideNode::Entry(ComponentOverride::Replace(with)))) => {
            (ResolvedNode::Component(with.clone()), Resolution::Replaced)
        }
        (
            DefaultNode::Leaf(default),
            Some(OverrideNode::Entry(ComponentOverride::Customize(record))),
        ) => (
            ResolvedNode::Component(customize(default, record, path)?),
            Resolution::Customized,
        ),
    };
    trace.resolved(path, resolution);
    Ok(resolved)
}

/// Wraps `default` without changing what it renders.
fn passthrough<N: 'static>(default: &Component<N>) -> Component<N> {
    let inner = default.clone();
    Component::from_parts(default.name_rc(), move |props| inner.render(props))
}

/// Builds the merging wrapper for a record override.
fn customize<N: 'static>(
    default: &Component<N>,
    record: &OverrideRecord<N>,
    path: &OverridePath,
) -> Result<Component<N>, OverrideError> {
    let props_style = record_props_style(record, path)?;
    let base = record.component().unwrap_or(default).clone();
    let record = record.clone();

    Ok(Component::from_parts(base.name_rc(), move |incoming| {
        let overridden = record.style().map(|style| style.evaluate(incoming));
        let style = merge_styles([incoming.style(), props_style.as_ref(), overridden.as_ref()]);

        let mut effective = match record.props() {
            Some(props) => incoming.overlay(props),
            None => incoming.clone(),
        };
        match style {
            Some(style) => effective.set(STYLE_PROP, style),
            None => {
                effective.remove(STYLE_PROP);
            }
        }
        base.render(&effective)
    }))
}

fn record_props_style<N>(
    record: &OverrideRecord<N>,
    path: &OverridePath,
) -> Result<Option<Style>, OverrideError> {
    match record.props().and_then(|props| props.get(STYLE_PROP)) {
        None => Ok(None),
        Some(PropValue::Style(style)) => Ok(Some(style.clone())),
        Some(_) => Err(OverrideError::malformed(path.clone(), Malformed::StyleProp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::StyleOverride;
    use crate::error::ErrorKind;
    use crate::props::Props;
    use crate::style::StyleValue;
    use crate::trace::TraceRecorder;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::Cell;

    /// Renders the props it receives, so tests can compare what arrived.
    fn probe(name: &'static str) -> Component<String> {
        Component::named(name, move |props: &Props<String>| {
            format!("{name}{props:?}")
        })
    }

    fn style_of(rendered: &Props<String>) -> Option<Style> {
        rendered.style().cloned()
    }

    /// A component that hands back the props it was instantiated with.
    fn capture() -> (Component<String>, Rc<core::cell::RefCell<Option<Props<String>>>>) {
        let seen = Rc::new(core::cell::RefCell::new(None));
        let sink = Rc::clone(&seen);
        let component = Component::named("Capture", move |props: &Props<String>| {
            *sink.borrow_mut() = Some(props.clone());
            String::from("captured")
        });
        (component, seen)
    }

    #[test]
    fn passthrough_renders_like_default() {
        let defaults = Defaults::new()
            .with_component("A", probe("A"))
            .with_component("B", probe("B"));
        let resolved = resolve(&defaults, None).unwrap();

        let props = Props::new().with("x", 1).with("style", Style::new().with("color", "blue"));
        for name in ["A", "B"] {
            let default = defaults.component(name).unwrap();
            let wrapped = resolved.get(name).unwrap();
            assert!(!wrapped.ptr_eq(default), "wrapping is unconditional");
            assert_eq!(wrapped.render(&props), default.render(&props));
            assert_eq!(wrapped.name(), default.name());
        }
    }

    #[test]
    fn empty_overrides_match_none() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let resolved = resolve(&defaults, Some(&Overrides::new())).unwrap();
        let props = Props::new().with("k", "v");
        assert_eq!(
            resolved.render("A", &props),
            Some(defaults.component("A").unwrap().render(&props))
        );
    }

    #[test]
    fn shorthand_is_used_as_is() {
        let replacement = probe("R");
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with("A", replacement.clone());

        let resolved = resolve(&defaults, Some(&overrides)).unwrap();
        assert!(resolved.get("A").unwrap().ptr_eq(&replacement));
    }

    #[test]
    fn style_merge_law() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().style(Style::new().with("color", "red")),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        let incoming = Props::new().with("style", Style::new().with("color", "blue").with("margin", 1));
        resolved.render("A", &incoming);

        let effective = seen.borrow().clone().unwrap();
        assert_eq!(
            style_of(&effective),
            Some(Style::new().with("color", "red").with("margin", 1))
        );
    }

    #[test]
    fn style_function_sees_instantiation_props() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().style_fn(|props: &Props<String>| {
                let open = props.get_bool("isOpen") == Some(true);
                Style::new().with("color", if open { "green" } else { "red" })
            }),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        resolved.render("A", &Props::new().with("isOpen", true));
        let effective = seen.borrow().clone().unwrap();
        assert_eq!(style_of(&effective), Some(Style::new().with("color", "green")));
        assert_eq!(effective.get_bool("isOpen"), Some(true));

        resolved.render("A", &Props::new());
        let effective = seen.borrow().clone().unwrap();
        assert_eq!(style_of(&effective), Some(Style::new().with("color", "red")));
    }

    #[test]
    fn record_props_win_and_style_is_set_last() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let record = OverrideRecord::builder()
            .props(
                Props::new()
                    .with("title", "override")
                    .with("style", Style::new().with("color", "blue").with("padding", 2)),
            )
            .style(Style::new().with("color", "red"));
        let overrides = Overrides::new().with("A", record);
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        let incoming = Props::new()
            .with("title", "incoming")
            .with("extra", 1)
            .with("style", Style::new().with("margin", 1).with("padding", 1));
        resolved.render("A", &incoming);

        let effective = seen.borrow().clone().unwrap();
        assert_eq!(effective.get_str("title"), Some("override"));
        assert_eq!(effective.get_int("extra"), Some(1));
        assert_eq!(
            style_of(&effective),
            Some(
                Style::new()
                    .with("color", "red")
                    .with("margin", 1)
                    .with("padding", 2)
            )
        );
    }

    #[test]
    fn no_style_anywhere_omits_style_prop() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().props(Props::new().with("msg", "hi")),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        resolved.render("A", &Props::new());
        let effective = seen.borrow().clone().unwrap();
        assert!(!effective.contains(STYLE_PROP));
        assert_eq!(effective.get_str("msg"), Some("hi"));
    }

    #[test]
    fn only_incoming_style_is_kept() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let overrides = Overrides::new().with("A", OverrideRecord::default());
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        let style = Style::new().with("color", "blue");
        resolved.render("A", &Props::new().with("style", style.clone()));
        let effective = seen.borrow().clone().unwrap();
        assert_eq!(style_of(&effective), Some(style));
    }

    #[test]
    fn record_component_replaces_base() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder()
                .component(target)
                .props(Props::new().with("msg", "hi")),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        assert_eq!(resolved.render("A", &Props::new()).as_deref(), Some("captured"));
        assert_eq!(seen.borrow().as_ref().and_then(|p| p.get_str("msg")), Some("hi"));
    }

    #[test]
    fn rendering_twice_is_deterministic() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder()
                .style(Style::new().with("color", "red"))
                .props(Props::new().with("msg", "hi")),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();
        let props = Props::new().with("style", Style::new().with("margin", 1));
        assert_eq!(resolved.render("A", &props), resolved.render("A", &props));
    }

    #[test]
    fn unknown_keys_are_ignored_by_default() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with("B", probe("B"));

        let resolved = resolve(&defaults, Some(&overrides)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(resolved.node("B").is_none());
    }

    #[test]
    fn unknown_keys_fail_in_strict_mode() {
        let defaults = Defaults::new().with_namespace("A", Defaults::new().with_component("X", probe("X")));
        let overrides =
            Overrides::new().with_namespace("A", Overrides::new().with("Y", probe("Y")));
        let options = ResolveOptions::new().with_unknown_targets(UnknownTargetHandling::Error);

        let err = resolve_with(&defaults, Some(&overrides), &options, &mut ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOverrideTarget);
        assert_eq!(err.path().segments().collect::<Vec<_>>(), ["A", "Y"]);
    }

    #[test]
    fn unknown_keys_warn_and_are_traced() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with("B", probe("B"));
        let options = ResolveOptions::new().with_unknown_targets(UnknownTargetHandling::Warn);
        let mut recorder = TraceRecorder::new();

        let resolved = resolve_with(&defaults, Some(&overrides), &options, &mut recorder).unwrap();
        assert!(resolved.node("B").is_none());
        assert_eq!(recorder.unknown_targets().len(), 1);
        assert_eq!(recorder.unknown_targets()[0].segments().collect::<Vec<_>>(), ["B"]);
    }

    #[test]
    fn nested_overrides_reach_inner_component() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_namespace("A", Defaults::new().with_component("B", target));
        let overrides = Overrides::new().with_namespace(
            "A",
            Overrides::new().with("B", OverrideRecord::builder().props(Props::new().with("msg", "hi"))),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();

        let inner = resolved.namespace("A").unwrap();
        inner.render("B", &Props::new().with("other", true));
        let effective = seen.borrow().clone().unwrap();
        assert_eq!(effective.get_str("msg"), Some("hi"));
        assert_eq!(effective.get_bool("other"), Some(true));
    }

    #[test]
    fn structure_mismatch_is_malformed() {
        let defaults = Defaults::new()
            .with_component("Leaf", probe("L"))
            .with_namespace("Space", Defaults::new().with_component("X", probe("X")));

        let leaf_as_space = Overrides::new().with_namespace("Leaf", Overrides::new());
        let err = resolve(&defaults, Some(&leaf_as_space)).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::MalformedOverrideEntry(Malformed::ExpectedEntry)
        );

        let space_as_leaf = Overrides::new().with("Space", probe("S"));
        let err = resolve(&defaults, Some(&space_as_leaf)).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::MalformedOverrideEntry(Malformed::ExpectedNamespace)
        );
    }

    #[test]
    fn non_style_style_prop_is_malformed() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().props(Props::new().with("style", "color: red")),
        );
        let err = resolve(&defaults, Some(&overrides)).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::MalformedOverrideEntry(Malformed::StyleProp)
        );
        assert_eq!(err.path().segments().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn dynamic_style_runs_per_instantiation() {
        let calls = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&calls);
        let defaults = Defaults::new().with_component("A", probe("A"));
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().style(StyleOverride::dynamic(move |_: &Props<String>| {
                counter.set(counter.get() + 1);
                Style::new().with("opacity", 0.5)
            })),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();
        assert_eq!(calls.get(), 0, "resolution does not evaluate styles");

        resolved.render("A", &Props::new());
        resolved.render("A", &Props::new());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn trace_reports_each_decision() {
        let defaults = Defaults::new()
            .with_component("Plain", probe("P"))
            .with_component("Swapped", probe("S"))
            .with_component("Styled", probe("T"))
            .with_namespace("Space", Defaults::new().with_component("Inner", probe("I")));
        let overrides = Overrides::new()
            .with("Swapped", probe("X"))
            .with("Styled", OverrideRecord::builder().style(Style::new().with("color", "red")));
        let mut recorder = TraceRecorder::new();

        resolve_with(&defaults, Some(&overrides), &ResolveOptions::new(), &mut recorder).unwrap();
        assert_eq!(recorder.resolution_of(&["Plain"]), Some(Resolution::Passthrough));
        assert_eq!(recorder.resolution_of(&["Swapped"]), Some(Resolution::Replaced));
        assert_eq!(recorder.resolution_of(&["Styled"]), Some(Resolution::Customized));
        assert_eq!(recorder.resolution_of(&["Space"]), Some(Resolution::Namespace));
        assert_eq!(
            recorder.resolution_of(&["Space", "Inner"]),
            Some(Resolution::Passthrough)
        );
    }

    #[test]
    fn each_pass_creates_new_wrappers() {
        let defaults = Defaults::new().with_component("A", probe("A"));
        let first = resolve(&defaults, None).unwrap();
        let second = resolve(&defaults, None).unwrap();
        assert!(!first.get("A").unwrap().ptr_eq(second.get("A").unwrap()));
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn style_value_kinds_survive_merge() {
        let (target, seen) = capture();
        let defaults = Defaults::new().with_component("A", target);
        let overrides = Overrides::new().with(
            "A",
            OverrideRecord::builder().style(Style::new().with("wrap", true).with("opacity", 0.5)),
        );
        let resolved = resolve(&defaults, Some(&overrides)).unwrap();
        resolved.render("A", &Props::new());

        let style = seen.borrow().as_ref().and_then(|p| p.style().cloned()).unwrap();
        assert_eq!(style.get("wrap"), Some(&StyleValue::Bool(true)));
        assert_eq!(style.get("opacity"), Some(&StyleValue::Float(0.5)));
    }
}
