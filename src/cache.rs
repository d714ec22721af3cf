/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The system variable cache: an in-memory snapshot of all system variables, refreshed in lock-step
//! with the block height.
//!
//! The key components of this module are:
//! - [`SystemVariableCache`], which owns the snapshot and exposes the entry points that the rest of the
//!   node uses: [`update`](SystemVariableCache::update), [`get_raw`](SystemVariableCache::get_raw),
//!   [`get`](SystemVariableCache::get), and [`set_unsafe`](SystemVariableCache::set_unsafe).
//! - [`CacheSnapshot`], the complete contents of the cache at a point in time.
//! - [`CacheState`], the lifecycle state of a cache.
//!
//! ## Updating the cache
//!
//! The calling application should call `update` once per block, with the block's height. An update:
//! 1. Fetches the [location directory](crate::directory) from its
//!    [configured location](crate::config::Configuration::directory_location), and deserializes it.
//! 2. Resolves the location of every system variable in the directory at the given height.
//! 3. [Fetches](crate::fan_in::fetch_all) the values at all resolved locations concurrently, bounded by
//!    the [refresh timeout](crate::config::Configuration::refresh_timeout).
//! 4. Replaces the snapshot wholesale with the fetched values.
//!
//! If any step fails, `update` returns the error and the snapshot is left exactly as it was before the
//! call. Serving slightly stale values is preferred over serving no values. A failed update can simply be
//! retried, e.g., at the next block.
//!
//! ## Concurrency
//!
//! The snapshot is guarded by a single [`RwLock`]. `update` holds the write lock for its entire
//! duration, so updates never interleave, and a reader concurrent with an update sees either the whole
//! snapshot from before the update or the whole snapshot from after it. Readers only ever hold the read
//! lock for the duration of a lookup, and never across I/O.
//!
//! ## Example
//!
//! ```ignore
//! let cache = SystemVariableCache::new(store, configuration);
//! cache.update(BlockHeight::new(1024))?;
//! let base_fee: u64 = cache.get("base_fee")?;
//! ```

use std::{
    collections::{btree_map, BTreeMap},
    error::Error,
    fmt::{self, Display, Formatter},
    io,
    sync::{PoisonError, RwLock},
    time::SystemTime,
};

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::{
    codec::{self, DecodeError},
    config::Configuration,
    directory::LocationDirectory,
    event_handlers::EventHandlers,
    events::{Event, SetOverrideEvent, UpdateCacheEvent, UpdateCacheFailedEvent},
    fan_in::{self, FetchError, FetchRequest},
    store::{BackingStore, StoreError},
    types::data_types::{BlockHeight, SnapshotDigest},
};

/// An in-memory snapshot of system variables, refreshed from a [`BackingStore`].
///
/// A node should construct exactly one `SystemVariableCache`, and share it (e.g., in an
/// [`Arc`](std::sync::Arc)) with every component that reads system variables.
pub struct SystemVariableCache<S: BackingStore> {
    store: S,
    config: Configuration,
    snapshot: RwLock<CacheSnapshot>,
    event_handlers: EventHandlers,
}

impl<S: BackingStore> SystemVariableCache<S> {
    /// Create an [empty](CacheState::Empty) cache that reads from `store`.
    pub fn new(store: S, config: Configuration) -> Self {
        Self::with_handlers(store, config, EventHandlers::new())
    }

    /// Create an [empty](CacheState::Empty) cache that reads from `store` and fires `event_handlers`.
    pub fn with_handlers(store: S, config: Configuration, event_handlers: EventHandlers) -> Self {
        let event_handlers = if config.log_events {
            event_handlers.with_loggers()
        } else {
            event_handlers
        };

        Self {
            store,
            config,
            snapshot: RwLock::new(CacheSnapshot::default()),
            event_handlers,
        }
    }

    /// Replace the snapshot with the values of all system variables as of `height`.
    ///
    /// On error, the snapshot is unchanged.
    pub fn update(&self, height: BlockHeight) -> Result<(), UpdateError> {
        let result = {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            self.fetch_variables(height).and_then(|variables| {
                let fetched = CacheSnapshot {
                    variables,
                    height: Some(height),
                };
                let digest = fetched.digest().map_err(UpdateError::EncodeSnapshot)?;
                let variables = fetched.len();
                *snapshot = fetched;
                Ok((variables, digest))
            })
        };

        match result {
            Ok((variables, digest)) => {
                self.event_handlers
                    .fire_handlers(Event::UpdateCache(UpdateCacheEvent {
                        timestamp: SystemTime::now(),
                        height,
                        variables,
                        digest,
                    }));
                Ok(())
            }
            Err(err) => {
                self.event_handlers
                    .fire_handlers(Event::UpdateCacheFailed(UpdateCacheFailedEvent {
                        timestamp: SystemTime::now(),
                        height,
                        cause: err.to_string(),
                    }));
                Err(err)
            }
        }
    }

    fn fetch_variables(&self, height: BlockHeight) -> Result<BTreeMap<String, Vec<u8>>, UpdateError> {
        let location = &self.config.directory_location;
        let directory_bytes = self.store.get(location.namespace(), location.key())?;
        let directory = LocationDirectory::from_bytes(&directory_bytes)?;

        let requests = directory
            .resolve_all(height)
            .into_iter()
            .map(FetchRequest::from)
            .collect();

        Ok(fan_in::fetch_all(
            &self.store,
            requests,
            self.config.refresh_timeout,
        )?)
    }

    /// Get the raw bytes of the variable called `name`, or `None` if the snapshot does not contain it.
    pub fn get_raw(&self, name: &str) -> Option<Vec<u8>> {
        self.read_snapshot().variables.get(name).cloned()
    }

    /// Get the value of the variable called `name`, deserialized into a `T`.
    pub fn get<T: BorshDeserialize>(&self, name: &str) -> Result<T, GetError> {
        self.read_snapshot().get(name)
    }

    /// Set the value of the variable called `name` in the snapshot directly, bypassing the backing store.
    ///
    /// # Safety
    ///
    /// This is not `unsafe` in the memory-safety sense, but should not be used in production. The
    /// overridden value exists only on this node, and so makes this node's view of system variables
    /// diverge from every other node's until the next successful [`update`](Self::update) replaces the
    /// snapshot. It exists to support tests and local overrides.
    pub fn set_unsafe<T: BorshSerialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), SetError> {
        let bytes = codec::encode(value).map_err(|source| SetError::Encode {
            name: name.to_string(),
            source,
        })?;
        let value_len = bytes.len();

        self.snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .variables
            .insert(name.to_string(), bytes);

        self.event_handlers
            .fire_handlers(Event::SetOverride(SetOverrideEvent {
                timestamp: SystemTime::now(),
                name: name.to_string(),
                value_len,
            }));

        Ok(())
    }

    /// Get a copy of the whole snapshot. Use this to read several related variables consistently.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.read_snapshot().clone()
    }

    pub fn state(&self) -> CacheState {
        match self.read_snapshot().height {
            None => CacheState::Empty,
            Some(height) => CacheState::Ready { height },
        }
    }

    /// Get the digest of the current snapshot. See [`CacheSnapshot::digest`].
    pub fn digest(&self) -> Result<SnapshotDigest, io::Error> {
        self.read_snapshot().digest()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    // The snapshot is only ever replaced or extended under the write lock in a single assignment, so a
    // poisoned lock still guards a complete snapshot.
    fn read_snapshot(&self) -> std::sync::RwLockReadGuard<'_, CacheSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lifecycle state of a [`SystemVariableCache`].
///
/// A cache starts out `Empty`, and becomes `Ready` after its first successful update. A failed update
/// never changes the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No update has succeeded yet.
    Empty,

    /// The last successful update was at `height`.
    Ready { height: BlockHeight },
}

/// The complete contents of a [`SystemVariableCache`] at a point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    variables: BTreeMap<String, Vec<u8>>,
    height: Option<BlockHeight>,
}

impl CacheSnapshot {
    /// Get the raw bytes of the variable called `name`.
    pub fn get_raw(&self, name: &str) -> Option<&[u8]> {
        self.variables.get(name).map(Vec::as_slice)
    }

    /// Get the value of the variable called `name`, deserialized into a `T`.
    pub fn get<T: BorshDeserialize>(&self, name: &str) -> Result<T, GetError> {
        let bytes = self.variables.get(name).ok_or_else(|| GetError::NotFound {
            name: name.to_string(),
        })?;
        codec::decode_exact(bytes).map_err(|source| GetError::Malformed {
            name: name.to_string(),
            source,
        })
    }

    /// Get the height of the update that produced this snapshot, or `None` if no update has succeeded.
    pub fn height(&self) -> Option<BlockHeight> {
        self.height
    }

    /// Iterate through the variables in this snapshot, in ascending order of name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<u8>> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Compute the SHA256 hash of the Borsh encoding of the mapping from variable names to values.
    ///
    /// The height is not part of the digest: two snapshots holding identical values have the same
    /// digest regardless of the height they were fetched at.
    ///
    /// Fails if the mapping cannot be encoded, which happens if a name or value is longer than
    /// `u32::MAX` bytes.
    pub fn digest(&self) -> Result<SnapshotDigest, io::Error> {
        let bytes = codec::encode(&self.variables)?;
        Ok(SnapshotDigest::new(Sha256::digest(bytes).into()))
    }
}

/// Error when [updating](SystemVariableCache::update) a cache. Each variant names the stage that failed.
#[derive(Debug)]
pub enum UpdateError {
    /// The location directory could not be read from the backing store.
    FetchDirectory(StoreError),

    /// The bytes read from the location directory's location are not a valid directory.
    DecodeDirectory(DecodeError),

    /// Fetching the values of the system variables failed or timed out.
    Fetch(FetchError),

    /// The fetched values could not be encoded to compute the new snapshot's digest.
    EncodeSnapshot(io::Error),
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::FetchDirectory(err) => write!(f, "failed to fetch location directory: {}", err),
            UpdateError::DecodeDirectory(err) => write!(f, "failed to decode location directory: {}", err),
            UpdateError::Fetch(err) => write!(f, "failed to fetch system variables: {}", err),
            UpdateError::EncodeSnapshot(err) => write!(f, "failed to encode new snapshot: {}", err),
        }
    }
}

impl Error for UpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UpdateError::FetchDirectory(err) => Some(err),
            UpdateError::DecodeDirectory(err) => Some(err),
            UpdateError::Fetch(err) => Some(err),
            UpdateError::EncodeSnapshot(err) => Some(err),
        }
    }
}

impl From<StoreError> for UpdateError {
    fn from(value: StoreError) -> Self {
        UpdateError::FetchDirectory(value)
    }
}

impl From<DecodeError> for UpdateError {
    fn from(value: DecodeError) -> Self {
        UpdateError::DecodeDirectory(value)
    }
}

impl From<FetchError> for UpdateError {
    fn from(value: FetchError) -> Self {
        UpdateError::Fetch(value)
    }
}

/// Error when [getting](SystemVariableCache::get) the value of a variable from a cache.
#[derive(Debug)]
pub enum GetError {
    /// The snapshot does not contain a variable called `name`.
    NotFound { name: String },

    /// The value of the variable called `name` could not be deserialized into the requested type.
    Malformed { name: String, source: DecodeError },
}

impl Display for GetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GetError::NotFound { name } => write!(f, "system variable {} not found", name),
            GetError::Malformed { name, source } => {
                write!(f, "system variable {} is malformed: {}", name, source)
            }
        }
    }
}

impl Error for GetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GetError::NotFound { .. } => None,
            GetError::Malformed { source, .. } => Some(source),
        }
    }
}

/// Error when [setting](SystemVariableCache::set_unsafe) the value of a variable in a cache.
#[derive(Debug)]
pub enum SetError {
    /// The value for the variable called `name` could not be serialized.
    Encode { name: String, source: io::Error },
}

impl Display for SetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SetError::Encode { name, source } => {
                write!(f, "failed to encode value of system variable {}: {}", name, source)
            }
        }
    }
}

impl Error for SetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SetError::Encode { source, .. } => Some(source),
        }
    }
}
