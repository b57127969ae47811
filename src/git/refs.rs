// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Point-in-time listing of a mirror's references.

use crate::error::{GitError, MirrorResult};

/// Ordered `(ref name, object id)` pairs, sorted by ref name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefSnapshot {
    refs: Vec<(String, String)>,
}

impl RefSnapshot {
    /// Parses `git for-each-ref --format='%(objectname) %(refname)'` output.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::UnexpectedOutput`] if a line is not `<oid> <ref>`.
    pub fn parse(output: &str) -> MirrorResult<Self> {
        let mut refs = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once(' ')
                    .filter(|(oid, name)| !oid.is_empty() && !name.is_empty())
                    .map(|(oid, name)| (name.to_string(), oid.to_string()))
                    .ok_or_else(|| GitError::UnexpectedOutput {
                        command: "git for-each-ref".to_string(),
                        output: line.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        refs.sort_unstable();
        Ok(Self { refs })
    }

    /// Builds a snapshot from `(ref name, object id)` pairs.
    pub fn from_pairs<I, N, O>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, O)>,
        N: Into<String>,
        O: Into<String>,
    {
        let mut refs: Vec<_> = pairs
            .into_iter()
            .map(|(name, oid)| (name.into(), oid.into()))
            .collect();
        refs.sort_unstable();
        Self { refs }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Object id of `name`, if the ref exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.refs
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()
            .map(|i| self.refs[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.refs.iter().map(|(n, o)| (n.as_str(), o.as_str()))
    }
}
