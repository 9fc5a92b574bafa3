// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized binding of defaults to override trees.
//!
//! Resolving creates fresh wrapper components. If a host re-resolved on every
//! render, each pass would hand its reconciler new component identities and
//! every default-state sub-component would be torn down and rebuilt. The
//! binders here keep the previous result and reuse it while the inputs stay
//! the same.
//!
//! Three entry points share one cache type, [`MemoCache`]:
//!
//! - [`with_overrides`]: wraps a render function into a new [`Component`]
//!   that reads the `overrides` prop and passes the resolved tree on.
//! - [`OverrideBinder::bind`]: returns the resolved tree directly, for hosts
//!   that keep one binder per component instance.
//! - [`BindingCx::use_overrides`]: the same, for hosts that keep one context
//!   and key caches by instance.
//!
//! # Invalidation
//!
//! A pass is a *hit* when the defaults are the same allocation and the
//! override trees compare equal under the [`MemoPolicy`](crate::MemoPolicy). A hit returns the
//! previous [`Resolved`] as-is.
//!
//! On a miss, invalidation is per top-level name: a name whose override node
//! is identical to last time (both absent, or the same entry by identity)
//! keeps its previously resolved node. Only changed names get new
//! components. Changing the defaults discards everything.

use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::component::Component;
use crate::error::{Malformed, OverrideError, OverridePath};
use crate::options::ResolveOptions;
use crate::props::{OVERRIDES_PROP, PropValue, Props};
use crate::resolve::{Reuse, resolve_namespace};
use crate::trace::ResolveTrace;
use crate::tree::{Defaults, Overrides, Resolved};

/// The last resolution of one binding instance.
struct MemoEntry<N> {
    defaults: Defaults<N>,
    /// Held so the allocation cannot be reused while we compare against it.
    overrides: Option<Overrides<N>>,
    resolved: Resolved<N>,
}

/// Per-instance memo of the last resolution.
///
/// A cache belongs to exactly one binding instance. It is never torn down
/// explicitly; it is overwritten when its inputs change.
pub struct MemoCache<N> {
    last: Option<MemoEntry<N>>,
}

impl<N> MemoCache<N> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Returns `true` if nothing has been resolved yet (or since the last
    /// [`invalidate`](Self::invalidate)).
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Forgets the last resolution; the next lookup resolves from scratch.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// The most recent result, if any.
    #[must_use]
    pub fn last_resolved(&self) -> Option<&Resolved<N>> {
        self.last.as_ref().map(|last| &last.resolved)
    }
}

impl<N: 'static> MemoCache<N> {
    /// Returns the resolution of `overrides` against `defaults`, reusing the
    /// previous result when allowed.
    pub fn get_or_resolve<T>(
        &mut self,
        defaults: &Defaults<N>,
        overrides: Option<&Overrides<N>>,
        options: &ResolveOptions,
        trace: &mut T,
    ) -> Result<Resolved<N>, OverrideError>
    where
        T: ResolveTrace + ?Sized,
    {
        let last = self
            .last
            .as_ref()
            .filter(|last| last.defaults.ptr_eq(defaults));

        if let Some(last) = last
            && options.memo().is_hit(last.overrides.as_ref(), overrides)
        {
            tracing::trace!("override memo hit");
            return Ok(last.resolved.clone());
        }

        tracing::trace!(incremental = last.is_some(), "override memo miss");
        let reuse = last.map(|last| Reuse {
            overrides: last.overrides.as_ref(),
            resolved: &last.resolved,
        });
        let resolved = resolve_namespace(
            defaults,
            overrides,
            &OverridePath::root(),
            reuse.as_ref(),
            options,
            trace,
        )?;

        self.last = Some(MemoEntry {
            defaults: defaults.clone(),
            overrides: overrides.cloned(),
            resolved: resolved.clone(),
        });
        Ok(resolved)
    }
}

impl<N> Default for MemoCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for MemoCache<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("last", &self.last_resolved())
            .finish()
    }
}

/// Lookup-form binder for one component instance.
///
/// # Example
///
/// ```rust
/// use understory_override::{Component, Defaults, OverrideBinder, Overrides, Props};
///
/// let label: Component<String> = Component::named("Label", |_: &Props<String>| "label".into());
/// let mut binder = OverrideBinder::new(Defaults::new().with_component("Label", label));
///
/// // Render 1 and render 2 with no overrides: same resolved components.
/// let first = binder.bind(None).unwrap();
/// let second = binder.bind(None).unwrap();
/// assert!(first.ptr_eq(&second));
///
/// // A rebuilt tree with new entries resolves again.
/// let custom: Component<String> = Component::new(|_: &Props<String>| "custom".into());
/// let third = binder.bind(Some(&Overrides::new().with("Label", custom))).unwrap();
/// assert!(!third.ptr_eq(&second));
/// assert_eq!(third.render("Label", &Props::new()).unwrap(), "custom");
/// ```
pub struct OverrideBinder<N> {
    defaults: Defaults<N>,
    options: ResolveOptions,
    cache: MemoCache<N>,
}

impl<N: 'static> OverrideBinder<N> {
    /// Creates a binder with default options.
    #[must_use]
    pub fn new(defaults: Defaults<N>) -> Self {
        Self::with_options(defaults, ResolveOptions::default())
    }

    /// Creates a binder with explicit options.
    #[must_use]
    pub fn with_options(defaults: Defaults<N>, options: ResolveOptions) -> Self {
        Self {
            defaults,
            options,
            cache: MemoCache::new(),
        }
    }

    /// The defaults this binder resolves against.
    #[must_use]
    pub fn defaults(&self) -> &Defaults<N> {
        &self.defaults
    }

    /// The options this binder resolves with.
    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolves the current override tree, reusing the last result when the
    /// tree is unchanged.
    pub fn bind(&mut self, overrides: Option<&Overrides<N>>) -> Result<Resolved<N>, OverrideError> {
        self.bind_with_trace(overrides, &mut ())
    }

    /// Like [`bind`](Self::bind), reporting decisions to `trace`.
    ///
    /// A memo hit reports nothing.
    pub fn bind_with_trace<T>(
        &mut self,
        overrides: Option<&Overrides<N>>,
        trace: &mut T,
    ) -> Result<Resolved<N>, OverrideError>
    where
        T: ResolveTrace + ?Sized,
    {
        self.cache
            .get_or_resolve(&self.defaults, overrides, &self.options, trace)
    }

    /// Forces the next [`bind`](Self::bind) to resolve from scratch.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

impl<N> fmt::Debug for OverrideBinder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideBinder")
            .field("defaults", &self.defaults)
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Memo caches for many component instances, keyed by a host instance key.
///
/// `K` is whatever identifies a mounted instance in the host (a node id, a
/// slot index). Each key owns one [`MemoCache`].
pub struct BindingCx<K, N> {
    options: ResolveOptions,
    caches: HashMap<K, MemoCache<N>>,
}

impl<K, N> BindingCx<K, N>
where
    K: Eq + Hash,
    N: 'static,
{
    /// Creates an empty context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    /// Creates an empty context with explicit options.
    #[must_use]
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            options,
            caches: HashMap::new(),
        }
    }

    /// Resolves `overrides` for `instance`, reusing that instance's last
    /// result when its inputs are unchanged.
    pub fn use_overrides(
        &mut self,
        instance: K,
        defaults: &Defaults<N>,
        overrides: Option<&Overrides<N>>,
    ) -> Result<Resolved<N>, OverrideError> {
        self.caches
            .entry(instance)
            .or_default()
            .get_or_resolve(defaults, overrides, &self.options, &mut ())
    }

    /// Drops the cache of an instance. Returns `true` if it had one.
    pub fn remove(&mut self, instance: &K) -> bool {
        self.caches.remove(instance).is_some()
    }

    /// Returns `true` if `instance` has a cache.
    #[must_use]
    pub fn contains(&self, instance: &K) -> bool {
        self.caches.contains_key(instance)
    }

    /// Number of instances with a cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Returns `true` if no instance has a cache.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

impl<K, N> Default for BindingCx<K, N>
where
    K: Eq + Hash,
    N: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, N> fmt::Debug for BindingCx<K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCx")
            .field("options", &self.options)
            .field("instances", &self.caches.len())
            .finish()
    }
}

/// Adapter-form binder with default options.
///
/// See [`with_overrides_options`].
///
/// # Example
///
/// ```rust
/// use understory_override::{
///     Component, Defaults, OverrideRecord, Overrides, Props, Style, with_overrides,
/// };
///
/// let title: Component<String> = Component::named("Title", |props: &Props<String>| {
///     let color = props.style().and_then(|s| s.get("color")).map(|c| c.to_string());
///     format!("<h1 color={}>{}</h1>", color.unwrap_or_default(), props.get_str("text").unwrap_or(""))
/// });
///
/// let card = with_overrides(
///     Defaults::new().with_component("Title", title),
///     |parts, props| {
///         let text = props.get_str("heading").unwrap_or("untitled");
///         parts.render("Title", &Props::new().with("text", text)).unwrap()
///     },
/// );
///
/// let plain = card.render(&Props::new().with("heading", "Hello"));
/// assert_eq!(plain, "<h1 color=>Hello</h1>");
///
/// let red = Overrides::new().with(
///     "Title",
///     OverrideRecord::builder().style(Style::new().with("color", "red")),
/// );
/// let styled = card.render(&Props::new().with("heading", "Hello").with("overrides", red));
/// assert_eq!(styled, "<h1 color=red>Hello</h1>");
/// ```
pub fn with_overrides<N, F>(defaults: Defaults<N>, render: F) -> Component<N>
where
    N: 'static,
    F: Fn(&Resolved<N>, &Props<N>) -> N + 'static,
{
    with_overrides_options(defaults, ResolveOptions::default(), render)
}

/// Adapter-form binder.
///
/// Returns a new component. Each time it is instantiated it reads the
/// [`OVERRIDES_PROP`] from its props, resolves it against `defaults` through
/// its own [`MemoCache`], and calls `render` with the resolved tree and the
/// remaining props (everything except [`OVERRIDES_PROP`]).
///
/// The returned component is one binding instance: clones share its cache.
/// The cache is not borrowed while `render` runs, so `render` may instantiate
/// the same component recursively.
///
/// # Panics
///
/// Instantiation panics if resolution fails: a malformed override tree, an
/// `overrides` prop that is not an override tree, or an unknown target under
/// [`UnknownTargetHandling::Error`](crate::UnknownTargetHandling::Error).
pub fn with_overrides_options<N, F>(
    defaults: Defaults<N>,
    options: ResolveOptions,
    render: F,
) -> Component<N>
where
    N: 'static,
    F: Fn(&Resolved<N>, &Props<N>) -> N + 'static,
{
    let cache = RefCell::new(MemoCache::new());
    Component::new(move |props: &Props<N>| {
        let resolved = overrides_prop(props).and_then(|overrides| {
            cache
                .borrow_mut()
                .get_or_resolve(&defaults, overrides, &options, &mut ())
        });
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => panic!("{err}"),
        };
        let mut forwarded = props.clone();
        forwarded.remove(OVERRIDES_PROP);
        render(&resolved, &forwarded)
    })
}

fn overrides_prop<N>(props: &Props<N>) -> Result<Option<&Overrides<N>>, OverrideError> {
    match props.get(OVERRIDES_PROP) {
        None => Ok(None),
        Some(PropValue::Overrides(overrides)) => Ok(Some(overrides)),
        Some(_) => Err(OverrideError::malformed(
            OverridePath::root(),
            Malformed::OverridesProp,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OverrideRecord;
    use crate::error::ErrorKind;
    use crate::options::{MemoPolicy, UnknownTargetHandling};
    use crate::style::Style;
    use crate::trace::{Resolution, TraceRecorder};
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::Cell;

    fn leaf(name: &'static str) -> Component<String> {
        Component::named(name, move |props: &Props<String>| format!("{name}{props:?}"))
    }

    fn defaults() -> Defaults<String> {
        Defaults::new()
            .with_component("A", leaf("A"))
            .with_component("B", leaf("B"))
            .with_namespace("Item", Defaults::new().with_component("Label", leaf("Label")))
    }

    fn red() -> OverrideRecord<String> {
        OverrideRecord::builder()
            .style(Style::new().with("color", "red"))
            .build()
    }

    #[test]
    fn same_tree_returns_same_instance() {
        let mut binder = OverrideBinder::new(defaults());
        let overrides = Overrides::new().with("A", red());

        let first = binder.bind(Some(&overrides)).unwrap();
        let second = binder.bind(Some(&overrides)).unwrap();
        assert!(first.ptr_eq(&second));
        for name in ["A", "B"] {
            assert!(first.get(name).unwrap().ptr_eq(second.get(name).unwrap()));
        }
    }

    #[test]
    fn no_overrides_is_stable_across_renders() {
        let mut binder = OverrideBinder::new(defaults());
        let first = binder.bind(None).unwrap();
        let second = binder.bind(None).unwrap();
        assert!(first.ptr_eq(&second));
        assert!(first
            .lookup(&["Item", "Label"])
            .unwrap()
            .ptr_eq(second.lookup(&["Item", "Label"]).unwrap()));
    }

    #[test]
    fn rebuilt_tree_with_same_entries_hits_under_shallow() {
        let mut binder = OverrideBinder::new(defaults());
        let record = red();

        let first = binder
            .bind(Some(&Overrides::new().with("A", record.clone())))
            .unwrap();
        let second = binder
            .bind(Some(&Overrides::new().with("A", record)))
            .unwrap();
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn rebuilt_tree_misses_under_identity_but_keeps_unchanged_names() {
        let options = ResolveOptions::new().with_memo(MemoPolicy::Identity);
        let mut binder = OverrideBinder::with_options(defaults(), options);
        let record = red();

        let first = binder
            .bind(Some(&Overrides::new().with("A", record.clone())))
            .unwrap();
        let second = binder
            .bind(Some(&Overrides::new().with("A", record)))
            .unwrap();
        assert!(!first.ptr_eq(&second));
        // Every entry is identical, so every name is reused.
        assert!(first.get("A").unwrap().ptr_eq(second.get("A").unwrap()));
        assert!(first.get("B").unwrap().ptr_eq(second.get("B").unwrap()));
    }

    #[test]
    fn changed_entry_invalidates_only_its_name() {
        let mut binder = OverrideBinder::new(defaults());
        let mut recorder = TraceRecorder::new();

        let first = binder
            .bind(Some(&Overrides::new().with("A", red())))
            .unwrap();
        let second = binder
            .bind_with_trace(Some(&Overrides::new().with("A", red())), &mut recorder)
            .unwrap();

        assert!(!first.get("A").unwrap().ptr_eq(second.get("A").unwrap()));
        assert!(first.get("B").unwrap().ptr_eq(second.get("B").unwrap()));
        assert!(first.namespace("Item").unwrap().ptr_eq(second.namespace("Item").unwrap()));
        assert_eq!(recorder.resolution_of(&["A"]), Some(Resolution::Customized));
        assert_eq!(recorder.resolution_of(&["B"]), Some(Resolution::Reused));
        assert_eq!(recorder.resolution_of(&["Item"]), Some(Resolution::Reused));
    }

    #[test]
    fn removing_an_override_restores_a_passthrough() {
        let mut binder = OverrideBinder::new(defaults());
        let replacement = leaf("R");

        let first = binder
            .bind(Some(&Overrides::new().with("A", replacement.clone())))
            .unwrap();
        assert!(first.get("A").unwrap().ptr_eq(&replacement));

        let second = binder.bind(None).unwrap();
        assert!(!second.get("A").unwrap().ptr_eq(&replacement));
        assert!(first.get("B").unwrap().ptr_eq(second.get("B").unwrap()));
    }

    #[test]
    fn invalidate_forces_fresh_components() {
        let mut binder = OverrideBinder::new(defaults());
        let first = binder.bind(None).unwrap();
        binder.invalidate();
        let second = binder.bind(None).unwrap();
        assert!(!first.get("A").unwrap().ptr_eq(second.get("A").unwrap()));
    }

    #[test]
    fn errors_are_not_cached() {
        let options = ResolveOptions::new().with_unknown_targets(UnknownTargetHandling::Error);
        let mut binder = OverrideBinder::with_options(defaults(), options);
        let good = binder.bind(None).unwrap();

        let bad = Overrides::new().with("Missing", leaf("M"));
        let err = binder.bind(Some(&bad)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOverrideTarget);

        let again = binder.bind(None).unwrap();
        assert!(good.ptr_eq(&again));
    }

    #[test]
    fn binding_cx_keeps_instances_apart() {
        let defaults = defaults();
        let mut cx: BindingCx<u32, String> = BindingCx::new();

        let one = cx.use_overrides(1, &defaults, None).unwrap();
        let two = cx.use_overrides(2, &defaults, None).unwrap();
        assert!(!one.ptr_eq(&two));
        assert_eq!(cx.len(), 2);

        let one_again = cx.use_overrides(1, &defaults, None).unwrap();
        assert!(one.ptr_eq(&one_again));

        assert!(cx.remove(&1));
        assert!(!cx.contains(&1));
        let one_fresh = cx.use_overrides(1, &defaults, None).unwrap();
        assert!(!one.ptr_eq(&one_fresh));
    }

    #[test]
    fn binding_cx_new_defaults_invalidate() {
        let mut cx: BindingCx<u32, String> = BindingCx::new();
        let first = cx.use_overrides(7, &defaults(), None).unwrap();
        let second = cx.use_overrides(7, &defaults(), None).unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(!first.get("A").unwrap().ptr_eq(second.get("A").unwrap()));
    }

    fn counting_adapter() -> (Component<String>, Rc<Cell<u32>>, Rc<RefCell<Vec<Resolved<String>>>>) {
        let calls = Rc::new(Cell::new(0_u32));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (calls_in, seen_in) = (Rc::clone(&calls), Rc::clone(&seen));
        let component = with_overrides(defaults(), move |parts, props| {
            calls_in.set(calls_in.get() + 1);
            seen_in.borrow_mut().push(parts.clone());
            format!("{props:?}")
        });
        (component, calls, seen)
    }

    #[test]
    fn adapter_memoizes_across_renders() {
        let (card, calls, seen) = counting_adapter();
        let overrides = Overrides::new().with("A", red());

        card.render(&Props::new().with(OVERRIDES_PROP, overrides.clone()));
        card.render(&Props::new().with(OVERRIDES_PROP, overrides));
        assert_eq!(calls.get(), 2);
        let seen = seen.borrow();
        assert!(seen[0].ptr_eq(&seen[1]));
    }

    #[test]
    fn adapter_strips_overrides_and_forwards_the_rest() {
        let (card, _, _) = counting_adapter();
        let out = card.render(
            &Props::new()
                .with("title", "x")
                .with(OVERRIDES_PROP, Overrides::new().with("A", red())),
        );
        assert!(out.contains("title"));
        assert!(!out.contains(OVERRIDES_PROP));
    }

    #[test]
    fn adapter_applies_overrides() {
        let (card, _, seen) = counting_adapter();
        let replacement = leaf("R");
        card.render(&Props::new().with(OVERRIDES_PROP, Overrides::new().with("A", replacement.clone())));
        assert!(seen.borrow()[0].get("A").unwrap().ptr_eq(&replacement));
    }

    #[test]
    #[should_panic(expected = "not an override tree")]
    fn adapter_rejects_wrong_overrides_prop() {
        let (card, _, _) = counting_adapter();
        card.render(&Props::new().with(OVERRIDES_PROP, 3));
    }

    #[test]
    #[should_panic(expected = "malformed override at `Item`")]
    fn adapter_fails_fast_on_malformed_tree() {
        let (card, _, _) = counting_adapter();
        card.render(&Props::new().with(OVERRIDES_PROP, Overrides::new().with("Item", leaf("X"))));
    }

    #[test]
    fn adapter_allows_recursive_render() {
        let depth = Rc::new(Cell::new(0_u32));
        let slot: Rc<RefCell<Option<Component<String>>>> = Rc::new(RefCell::new(None));
        let (depth_in, slot_in) = (Rc::clone(&depth), Rc::clone(&slot));

        let tree = with_overrides(defaults(), move |_, props| {
            depth_in.set(depth_in.get() + 1);
            let level = props.get_int("level").unwrap_or(0);
            if level == 0 {
                return String::from("leaf");
            }
            let this = slot_in.borrow().clone().unwrap();
            this.render(&Props::new().with("level", level - 1))
        });
        *slot.borrow_mut() = Some(tree.clone());

        assert_eq!(tree.render(&Props::new().with("level", 3)), "leaf");
        assert_eq!(depth.get(), 4);
    }

    #[test]
    fn nested_overrides_flow_through_record_props() {
        // An inner overridable component receives its own tree through the
        // record props of the outer override.
        let inner = with_overrides(
            Defaults::new().with_component("Icon", leaf("Icon")),
            |parts, _| parts.render("Icon", &Props::new()).unwrap(),
        );
        let outer = with_overrides(
            Defaults::new().with_component("Button", inner),
            |parts, _| parts.render("Button", &Props::new()).unwrap(),
        );

        let star = Component::named("Star", |_: &Props<String>| String::from("*"));
        let overrides = Overrides::new().with(
            "Button",
            OverrideRecord::builder()
                .props(Props::new().with(OVERRIDES_PROP, Overrides::new().with("Icon", star))),
        );

        assert_eq!(outer.render(&Props::new()), "Icon{}");
        assert_eq!(
            outer.render(&Props::new().with(OVERRIDES_PROP, overrides)),
            "*"
        );
    }
}
