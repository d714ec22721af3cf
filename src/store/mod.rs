/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Trait for the pluggable, namespaced key-value store that system variables are read from.
//!
//! The cache is agnostic to where system variables are authoritatively stored. It may be a client of a
//! remote, networked store, or the file-backed [`MockStore`](mock::MockStore) provided in this module.
//! Library users plug in their choice by implementing [`BackingStore`].
//!
//! # Contract
//!
//! `BackingStore::get` is the only operation the cache needs. The cache assumes nothing else about
//! it: a call may be slow, may be served remotely, and may fail. Every call is treated as independently
//! failable and independently latent, and the cache adds no retries or caching of its own on top of a
//! single call.
//!
//! Each refresh of the cache calls `get` concurrently from multiple threads, each holding its own
//! clone of the store. Implementations that share state between clones (e.g., a connection pool)
//! should do so through an `Arc`.

pub mod mock;

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

pub trait BackingStore: Clone + Send + Sync + 'static {
    /// Get the value stored at `key` inside `namespace`.
    fn get(&self, namespace: &[u8], key: &[u8]) -> Result<Vec<u8>, StoreError>;
}

/// Error when trying to read a value from a [`BackingStore`].
#[derive(Debug)]
pub enum StoreError {
    /// The store is reachable, but holds no value at the requested namespace and key.
    KeyNotFound { namespace: Vec<u8>, key: Vec<u8> },

    /// The store could not be reached, or failed to serve the request.
    Unavailable { reason: String },

    /// I/O error while reading from the store.
    Io(io::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::KeyNotFound { namespace, key } => {
                write!(f, "no value at key {:?} in namespace {:?}", key, namespace)
            }
            StoreError::Unavailable { reason } => write!(f, "store unavailable: {}", reason),
            StoreError::Io(err) => write!(f, "store I/O error: {}", err),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        StoreError::Io(value)
    }
}
