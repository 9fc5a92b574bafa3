// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution errors.

use alloc::rc::Rc;
use core::fmt;

use smallvec::SmallVec;

/// Location of a node in a component tree, as a list of names.
///
/// Displays as dotted names, e.g. `Item.Label`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct OverridePath {
    segments: SmallVec<[Rc<str>; 4]>,
}

impl OverridePath {
    /// The empty path, naming the top of a tree.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns this path extended by `name`.
    #[must_use]
    pub fn child(&self, name: impl Into<Rc<str>>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns `true` for the root path.
    #[must_use]
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates the names from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|segment| segment.as_ref())
    }
}

impl<S: Into<Rc<str>>> FromIterator<S> for OverridePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for OverridePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for OverridePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverridePath({self})")
    }
}

/// Why an override entry is malformed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Malformed {
    /// The defaults declare a namespace here, but the override is an entry.
    ExpectedNamespace,
    /// The defaults declare a component here, but the override is a namespace.
    ExpectedEntry,
    /// A record's `props` hold a non-style value under the `style` name.
    StyleProp,
    /// The `overrides` prop holds something other than an override tree.
    OverridesProp,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExpectedNamespace => "expected a namespace of overrides, found a single entry",
            Self::ExpectedEntry => "expected a single override entry, found a namespace",
            Self::StyleProp => "the `style` prop of an override record is not a style",
            Self::OverridesProp => "the `overrides` prop is not an override tree",
        })
    }
}

/// Kind of [`OverrideError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The override tree names a component the defaults do not declare.
    UnknownOverrideTarget,
    /// The override entry does not fit the defaults.
    MalformedOverrideEntry(Malformed),
}

/// Error returned when an override tree cannot be resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct OverrideError {
    kind: ErrorKind,
    path: OverridePath,
}

impl OverrideError {
    pub(crate) fn unknown_target(path: OverridePath) -> Self {
        Self {
            kind: ErrorKind::UnknownOverrideTarget,
            path,
        }
    }

    pub(crate) fn malformed(path: OverridePath, why: Malformed) -> Self {
        Self {
            kind: ErrorKind::MalformedOverrideEntry(why),
            path,
        }
    }

    /// What went wrong.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Where it went wrong.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &OverridePath {
        &self.path
    }
}

impl fmt::Debug for OverrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OverrideError {{ kind: {:?}, path: {} }}",
            self.kind, self.path
        )
    }
}

impl fmt::Display for OverrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::UnknownOverrideTarget => write!(
                f,
                "override targets `{}`, which has no default component",
                self.path
            ),
            ErrorKind::MalformedOverrideEntry(why) => {
                write!(f, "malformed override at `{}`: {why}", self.path)
            }
        }
    }
}

impl core::error::Error for OverrideError {}
