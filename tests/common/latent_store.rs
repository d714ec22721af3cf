//! A [`BackingStore`] that wraps [`MockStore`] to simulate a slow or partially unavailable networked store.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use borsh::BorshSerialize;
use sysvar_cache::{
    directory::LocationDirectory,
    store::{mock::MockStore, BackingStore, StoreError},
    types::data_types::{BlockHeight, NamespacedKey},
    variables,
};

pub(crate) const NAMESPACE: &[u8] = b"params";

/// Every call to `get` sleeps for `latency` before being served by the inner [`MockStore`], except
/// calls for keys in `failing_keys`, which fail immediately.
#[derive(Clone)]
pub(crate) struct LatentStore {
    inner: MockStore,
    latency: Arc<Mutex<Duration>>,
    failing_keys: Arc<Mutex<HashSet<Vec<u8>>>>,
    calls: Arc<AtomicUsize>,
}

impl LatentStore {
    pub(crate) fn new(latency: Duration) -> LatentStore {
        LatentStore {
            inner: MockStore::new(),
            latency: Arc::new(Mutex::new(latency)),
            failing_keys: Arc::new(Mutex::new(HashSet::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn inner(&self) -> &MockStore {
        &self.inner
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub(crate) fn fail_key(&self, key: &[u8]) {
        self.failing_keys.lock().unwrap().insert(key.to_vec());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Store `value` at `key` in [`NAMESPACE`].
    pub(crate) fn put<T: BorshSerialize>(&self, key: &str, value: &T) {
        self.inner
            .set(NAMESPACE, key.as_bytes(), value.try_to_vec().unwrap());
    }

    /// Store `directory` at the default location directory location.
    pub(crate) fn put_directory(&self, directory: &LocationDirectory) {
        self.inner.set(
            variables::SYSTEM_NAMESPACE,
            variables::LOCATION_DIRECTORY_KEY,
            directory.to_bytes().unwrap(),
        );
    }
}

impl BackingStore for LatentStore {
    fn get(&self, namespace: &[u8], key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(StoreError::Unavailable {
                reason: format!("key {:?} is unreachable", key),
            });
        }

        let latency = *self.latency.lock().unwrap();
        thread::sleep(latency);
        self.inner.get(namespace, key)
    }
}

/// Location of the variable called `name` in a [`LatentStore`].
pub(crate) fn location(name: &str) -> NamespacedKey {
    NamespacedKey::new(NAMESPACE, name.as_bytes())
}

/// A directory in which every variable in `names` is stored under its own name in [`NAMESPACE`].
pub(crate) fn directory_of(names: &[&str]) -> LocationDirectory {
    let mut directory = LocationDirectory::new();
    for name in names {
        directory
            .install(*name, location(name), BlockHeight::new(0), BlockHeight::new(1))
            .unwrap();
    }
    directory
}
