/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A file-backed, in-memory implementation of [`BackingStore`].
//!
//! `MockStore` keeps a mapping of namespace -> key -> value in memory, and can [load](MockStore::load)
//! it from, or [dump](MockStore::dump) it into, a file containing the Borsh-serialized mapping. It is
//! intended for tests and local development in place of a live networked store.
//!
//! Clones of a `MockStore` share the same mapping, so writes made through one clone are visible to
//! reads made through every other.

use std::{
    collections::BTreeMap,
    fs,
    io,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use crate::codec;

use super::{BackingStore, StoreError};

type Namespaces = BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, Vec<u8>>>;

#[derive(Clone, Default)]
pub struct MockStore(Arc<RwLock<Namespaces>>);

impl MockStore {
    /// Create a new, empty `MockStore`.
    pub fn new() -> MockStore {
        MockStore(Arc::new(RwLock::new(BTreeMap::new())))
    }

    /// Create a `MockStore` holding the mapping dumped into the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<MockStore, StoreError> {
        let bytes = fs::read(path)?;
        let namespaces: Namespaces = codec::decode_exact(&bytes)
            .map_err(|err| StoreError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        Ok(MockStore(Arc::new(RwLock::new(namespaces))))
    }

    /// Write the whole mapping into the file at `path`, replacing its contents.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let bytes = {
            let namespaces = self.0.read().unwrap_or_else(PoisonError::into_inner);
            codec::encode(&*namespaces)?
        };
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Set the value at `key` inside `namespace`, creating the namespace if it does not exist yet.
    pub fn set(&self, namespace: &[u8], key: &[u8], value: Vec<u8>) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(namespace.to_vec())
            .or_default()
            .insert(key.to_vec(), value);
    }

    /// Delete the value at `key` inside `namespace`, returning it if it existed.
    pub fn delete(&self, namespace: &[u8], key: &[u8]) -> Option<Vec<u8>> {
        let mut namespaces = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let keys = namespaces.get_mut(namespace)?;
        let value = keys.remove(key);
        if keys.is_empty() {
            namespaces.remove(namespace);
        }
        value
    }

    /// Remove every namespace from the store.
    pub fn clear(&self) {
        self.0.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl BackingStore for MockStore {
    fn get(&self, namespace: &[u8], key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .and_then(|keys| keys.get(key))
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound {
                namespace: namespace.to_vec(),
                key: key.to_vec(),
            })
    }
}
