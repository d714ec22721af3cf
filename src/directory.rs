/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The location directory: where in the backing store each system variable is stored.
//!
//! # Fork avoidance
//!
//! Validators operate independently, yet must never disagree about the value of a system variable
//! within the same block. Moving a variable from one storage location to another is therefore never
//! done "right now". Instead, a [`DeferredChange`] is installed that names both the location in use
//! today and the location that takes over at a future height, `change_on`. Every node then resolves a
//! variable's location using only two inputs it can compute locally: the bytes of the directory and the
//! current block height:
//!
//! ```text
//! resolve(directory, name, height) = future   if height >= change_on
//!                                    current  otherwise
//! ```
//!
//! # Persistence
//!
//! The directory is stored Borsh-serialized at a single, well-known
//! [location](crate::variables::location_directory) in the backing store. The cache never keeps a
//! decoded directory around between refreshes: it is fetched and [deserialized](LocationDirectory::from_bytes)
//! fresh on every [update](crate::cache::SystemVariableCache::update).

use std::{
    collections::{btree_map, BTreeMap},
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    codec::{self, DecodeError},
    types::data_types::{BlockHeight, DeferredChange, NamespacedKey},
};

/// Mapping from the name of a system variable to its [`DeferredChange`] record.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LocationDirectory(BTreeMap<String, DeferredChange>);

impl LocationDirectory {
    /// Create an empty `LocationDirectory`.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Get the location that backs the variable called `name` at `height`.
    ///
    /// This is a pure function of the directory and `height`.
    pub fn resolve(&self, name: &str, height: BlockHeight) -> Result<&NamespacedKey, DirectoryError> {
        self.0
            .get(name)
            .map(|deferred_change| deferred_change.location_at(height))
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Resolve the location of every variable in the directory at `height`.
    pub fn resolve_all(&self, height: BlockHeight) -> Vec<(String, NamespacedKey)> {
        self.0
            .iter()
            .map(|(name, deferred_change)| (name.clone(), deferred_change.location_at(height).clone()))
            .collect()
    }

    /// Schedule the variable called `name` to be read from `location` starting from `change_on`.
    ///
    /// The record that gets installed keeps, as its `current` location, whatever the existing record
    /// for `name` resolves to at `current_height`. If `name` has no record yet, both `current` and
    /// `future` are set to `location`, so the variable is readable from `location` at every height.
    ///
    /// Fails with [`DirectoryError::ChangeNotInFuture`] if `change_on` is not strictly greater than
    /// `current_height`. A change that takes effect at or below the current height would alter what
    /// nodes that already processed those heights should have read.
    pub fn install(
        &mut self,
        name: impl Into<String>,
        location: NamespacedKey,
        current_height: BlockHeight,
        change_on: BlockHeight,
    ) -> Result<(), DirectoryError> {
        let name = name.into();
        if change_on <= current_height {
            return Err(DirectoryError::ChangeNotInFuture {
                name,
                current_height,
                change_on,
            });
        }

        let current = match self.0.get(&name) {
            Some(existing) => existing.location_at(current_height).clone(),
            None => location.clone(),
        };
        self.0
            .insert(name, DeferredChange::new(current, location, change_on));

        Ok(())
    }

    /// Remove the record of the variable called `name`, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<DeferredChange> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&DeferredChange> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate through the records in the directory, in ascending order of variable name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, DeferredChange> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize the directory into the form in which it is stored in the backing store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, io::Error> {
        codec::encode(self)
    }

    /// Deserialize a directory read from the backing store.
    ///
    /// Fails with [`DecodeError::TrailingData`] if `bytes` contains anything after the encoded
    /// directory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::decode_exact(bytes)
    }
}

impl FromIterator<(String, DeferredChange)> for LocationDirectory {
    fn from_iter<I: IntoIterator<Item = (String, DeferredChange)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LocationDirectory {
    type Item = (&'a String, &'a DeferredChange);
    type IntoIter = btree_map::Iter<'a, String, DeferredChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Error when querying or modifying a [`LocationDirectory`].
#[derive(Debug, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory has no record for the variable called `name`.
    NotFound { name: String },

    /// A change was scheduled to take effect at or below the height at which it was installed.
    ChangeNotInFuture {
        name: String,
        current_height: BlockHeight,
        change_on: BlockHeight,
    },
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::NotFound { name } => {
                write!(f, "system variable {} not found in location directory", name)
            }
            DirectoryError::ChangeNotInFuture {
                name,
                current_height,
                change_on,
            } => write!(
                f,
                "change of system variable {} scheduled on height {}, which is not after current height {}",
                name, change_on, current_height
            ),
        }
    }
}

impl Error for DirectoryError {}
