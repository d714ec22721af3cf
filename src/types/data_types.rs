/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that exist only to store bytes, and do not have any major "active" behavior.

use std::fmt::{self, Debug, Display, Formatter};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use borsh::{BorshDeserialize, BorshSerialize};

/// Height of a block in the blockchain.
///
/// Supplied by the calling application every time the cache is [updated](crate::cache::SystemVariableCache::update).
/// The cache does not enforce that heights passed to consecutive updates increase.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// Create a new `BlockHeight` with an `int` inner value.
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    /// Get the inner `u64` value of this `BlockHeight`.
    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for BlockHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Address of exactly one value in a [backing store](crate::store::BackingStore).
///
/// Two `NamespacedKey`s are equal if and only if both their namespaces and their keys are byte-wise
/// equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize)]
pub struct NamespacedKey {
    namespace: Vec<u8>,
    key: Vec<u8>,
}

impl NamespacedKey {
    /// Create a new `NamespacedKey` addressing `key` inside `namespace`.
    pub fn new(namespace: impl Into<Vec<u8>>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    pub fn namespace(&self) -> &[u8] {
        &self.namespace
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Display for NamespacedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            STANDARD_NO_PAD.encode(&self.namespace),
            STANDARD_NO_PAD.encode(&self.key)
        )
    }
}

impl Debug for NamespacedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "NamespacedKey({})", self)
    }
}

/// The storage location of a single system variable, together with a scheduled move to a new location.
///
/// `DeferredChange`s are never mutated. A logical "update" of a variable's location replaces its
/// record in the [`LocationDirectory`](crate::directory::LocationDirectory) wholesale, see
/// [`install`](crate::directory::LocationDirectory::install).
///
/// # Invariants
///
/// 1. `current` is the location that was authoritative immediately before this record was installed.
/// 2. `change_on` is strictly greater than the height at which this record was installed.
#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct DeferredChange {
    current: NamespacedKey,
    future: NamespacedKey,
    change_on: BlockHeight,
}

impl DeferredChange {
    pub fn new(current: NamespacedKey, future: NamespacedKey, change_on: BlockHeight) -> Self {
        Self {
            current,
            future,
            change_on,
        }
    }

    pub fn current(&self) -> &NamespacedKey {
        &self.current
    }

    pub fn future(&self) -> &NamespacedKey {
        &self.future
    }

    pub fn change_on(&self) -> BlockHeight {
        self.change_on
    }

    /// Get the location that is authoritative at `height`: `future` if `height >= change_on`, else
    /// `current`.
    ///
    /// This must remain a pure function of `self` and `height`. Every node computes it independently,
    /// and two nodes that disagree on its output for the same block would read different values for
    /// the same variable.
    pub fn location_at(&self, height: BlockHeight) -> &NamespacedKey {
        if height >= self.change_on {
            &self.future
        } else {
            &self.current
        }
    }
}

/// SHA256 hash of the canonical encoding of a [`CacheSnapshot`](crate::cache::CacheSnapshot).
///
/// Two nodes whose caches hold the same variables with the same values compute the same digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl Display for SnapshotDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", STANDARD_NO_PAD.encode(self.0))
    }
}

impl Debug for SnapshotDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
