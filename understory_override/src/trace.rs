// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability hooks for override resolution.
//!
//! Resolution does not keep any record of *how* each name was resolved. When
//! an embedder wants to answer "why is this label red?" or "which names did
//! this override tree miss?", it can pass a [`ResolveTrace`] to
//! [`resolve_with`](crate::resolve_with) or
//! [`OverrideBinder::bind_with_trace`](crate::OverrideBinder::bind_with_trace).
//! [`TraceRecorder`] is a small ready-made sink.

use alloc::vec::Vec;

use crate::error::OverridePath;

/// How one name of the defaults was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// No override; the default was wrapped unchanged.
    Passthrough,
    /// A shorthand override replaced the default outright.
    Replaced,
    /// A record override was applied through a merging wrapper.
    Customized,
    /// A namespace was resolved (its children are reported separately).
    Namespace,
    /// The binder reused the node from its previous pass.
    Reused,
}

/// A callback sink for resolution tracing.
pub trait ResolveTrace {
    /// Called once per resolved name, children before their namespace.
    fn resolved(&mut self, path: &OverridePath, resolution: Resolution);

    /// Called for every override name that the defaults do not declare,
    /// regardless of [`UnknownTargetHandling`](crate::UnknownTargetHandling).
    fn unknown_target(&mut self, path: &OverridePath);
}

/// The no-op trace.
impl ResolveTrace for () {
    #[inline]
    fn resolved(&mut self, _path: &OverridePath, _resolution: Resolution) {}

    #[inline]
    fn unknown_target(&mut self, _path: &OverridePath) {}
}

impl<T: ResolveTrace + ?Sized> ResolveTrace for &mut T {
    fn resolved(&mut self, path: &OverridePath, resolution: Resolution) {
        (**self).resolved(path, resolution);
    }

    fn unknown_target(&mut self, path: &OverridePath) {
        (**self).unknown_target(path);
    }
}

/// Records every resolution decision and unknown target, in order.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    resolutions: Vec<(OverridePath, Resolution)>,
    unknown_targets: Vec<OverridePath>,
}

impl TraceRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything recorded.
    pub fn clear(&mut self) {
        self.resolutions.clear();
        self.unknown_targets.clear();
    }

    /// All recorded decisions, in the order they were made.
    #[must_use]
    pub fn resolutions(&self) -> &[(OverridePath, Resolution)] {
        &self.resolutions
    }

    /// All recorded unknown targets.
    #[must_use]
    pub fn unknown_targets(&self) -> &[OverridePath] {
        &self.unknown_targets
    }

    /// The most recent decision for the name at `path` (e.g. `["Item", "Label"]`).
    #[must_use]
    pub fn resolution_of(&self, path: &[&str]) -> Option<Resolution> {
        self.resolutions
            .iter()
            .rev()
            .find(|(recorded, _)| recorded.segments().eq(path.iter().copied()))
            .map(|(_, resolution)| *resolution)
    }
}

impl ResolveTrace for TraceRecorder {
    fn resolved(&mut self, path: &OverridePath, resolution: Resolution) {
        self.resolutions.push((path.clone(), resolution));
    }

    fn unknown_target(&mut self, path: &OverridePath) {
        self.unknown_targets.push(path.clone());
    }
}
