// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution and memoization policies.

use crate::tree::Overrides;

/// How to handle override names the defaults do not declare.
///
/// Whatever the policy, unknown names never appear in the resolved tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum UnknownTargetHandling {
    /// Skip them silently.
    ///
    /// This is the default: a stale override must not break rendering.
    #[default]
    Ignore,
    /// Skip them and emit a `tracing` warning.
    Warn,
    /// Fail resolution with
    /// [`ErrorKind::UnknownOverrideTarget`](crate::ErrorKind::UnknownOverrideTarget).
    Error,
}

/// When the binder may reuse its previous result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MemoPolicy {
    /// Reuse only for the same override tree allocation (or no tree twice).
    Identity,
    /// Also reuse when the tree was rebuilt from identical entries.
    ///
    /// See [`Overrides::shallow_eq`]. A missing tree and an empty tree are
    /// treated alike.
    #[default]
    Shallow,
}

impl MemoPolicy {
    /// Returns `true` if a result computed for `previous` can serve `next`.
    #[must_use]
    pub fn is_hit<N>(self, previous: Option<&Overrides<N>>, next: Option<&Overrides<N>>) -> bool {
        match (self, previous, next) {
            (_, None, None) => true,
            (Self::Identity, Some(a), Some(b)) => a.ptr_eq(b),
            (Self::Shallow, Some(a), Some(b)) => a.shallow_eq(b),
            (Self::Shallow, Some(tree), None) | (Self::Shallow, None, Some(tree)) => {
                tree.is_empty()
            }
            (Self::Identity, _, _) => false,
        }
    }
}

/// Options shared by the resolver and the binders.
///
/// # Example
///
/// ```rust
/// use understory_override::{MemoPolicy, ResolveOptions, UnknownTargetHandling};
///
/// let strict = ResolveOptions::new()
///     .with_unknown_targets(UnknownTargetHandling::Error)
///     .with_memo(MemoPolicy::Identity);
///
/// assert_eq!(strict.unknown_targets(), UnknownTargetHandling::Error);
/// assert_eq!(ResolveOptions::default().memo(), MemoPolicy::Shallow);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ResolveOptions {
    unknown_targets: UnknownTargetHandling,
    memo: MemoPolicy,
}

impl ResolveOptions {
    /// Default options: ignore unknown targets, shallow memoization.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unknown_targets: UnknownTargetHandling::Ignore,
            memo: MemoPolicy::Shallow,
        }
    }

    /// Sets the unknown-target policy.
    #[must_use]
    pub const fn with_unknown_targets(mut self, handling: UnknownTargetHandling) -> Self {
        self.unknown_targets = handling;
        self
    }

    /// Sets the memoization policy.
    #[must_use]
    pub const fn with_memo(mut self, memo: MemoPolicy) -> Self {
        self.memo = memo;
        self
    }

    /// The unknown-target policy.
    #[must_use]
    #[inline]
    pub const fn unknown_targets(&self) -> UnknownTargetHandling {
        self.unknown_targets
    }

    /// The memoization policy.
    #[must_use]
    #[inline]
    pub const fn memo(&self) -> MemoPolicy {
        self.memo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use alloc::string::String;

    fn tree() -> Overrides<String> {
        Overrides::new().with("A", Component::new(|_| String::new()))
    }

    #[test]
    fn new_matches_default() {
        assert_eq!(ResolveOptions::new(), ResolveOptions::default());
    }

    #[test]
    fn identity_requires_same_tree() {
        let a = tree();
        let rebuilt = Overrides::new().with_node("A", a.get("A").unwrap().clone());
        assert!(MemoPolicy::Identity.is_hit(Some(&a), Some(&a.clone())));
        assert!(!MemoPolicy::Identity.is_hit(Some(&a), Some(&rebuilt)));
        assert!(MemoPolicy::Identity.is_hit::<String>(None, None));
        assert!(!MemoPolicy::Identity.is_hit(None, Some(&Overrides::<String>::new())));
    }

    #[test]
    fn shallow_accepts_rebuilt_tree() {
        let a = tree();
        let rebuilt = Overrides::new().with_node("A", a.get("A").unwrap().clone());
        assert!(MemoPolicy::Shallow.is_hit(Some(&a), Some(&rebuilt)));
        assert!(!MemoPolicy::Shallow.is_hit(Some(&a), Some(&tree())));
    }

    #[test]
    fn shallow_treats_empty_as_missing() {
        let empty = Overrides::<String>::new();
        assert!(MemoPolicy::Shallow.is_hit(None, Some(&empty)));
        assert!(MemoPolicy::Shallow.is_hit(Some(&empty), None));
        assert!(!MemoPolicy::Shallow.is_hit(Some(&tree()), None));
    }
}
