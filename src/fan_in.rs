/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Concurrent, all-or-nothing fetching of many values from a [`BackingStore`].
//!
//! [`fetch_all`] spawns one thread per [`FetchRequest`]. Each thread makes exactly one
//! [`get`](BackingStore::get) call and reports its outcome, a value or an error, through a shared
//! channel. The calling thread collects outcomes until one of three things happens:
//! 1. All outcomes arrived and all of them are values: the values are returned.
//! 2. An error arrived: it is returned immediately, without waiting for the remaining outcomes.
//! 3. The timeout elapsed: [`FetchError::Timeout`] is returned.
//!
//! Partial results are never returned. A set of values in which some are fresh and some are missing
//! or stale could be inconsistent between related variables.
//!
//! ## Abandoned fetches
//!
//! `BackingStore` offers no way to cancel a call in progress. In cases 2 and 3, the threads whose
//! calls have not returned yet are abandoned: they keep running until their call returns, after which
//! their outcome is sent into a channel that no longer has a receiver, and is dropped.

use std::{
    collections::BTreeMap,
    error::Error,
    fmt::{self, Display, Formatter},
    io,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use crate::{store::{BackingStore, StoreError}, types::data_types::NamespacedKey};

/// A request to fetch the value of the system variable called `name` from `location`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub name: String,
    pub location: NamespacedKey,
}

impl FetchRequest {
    pub fn new(name: impl Into<String>, location: NamespacedKey) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

impl From<(String, NamespacedKey)> for FetchRequest {
    fn from((name, location): (String, NamespacedKey)) -> Self {
        FetchRequest { name, location }
    }
}

type FetchOutcome = Result<(String, Vec<u8>), FetchError>;

/// Fetch the values of all `requests` from `store` concurrently, failing if any single fetch fails or
/// if not all of them complete within `timeout`.
///
/// On success, returns a mapping from the `name` of every request to the value fetched for it.
pub fn fetch_all<S: BackingStore>(
    store: &S,
    requests: Vec<FetchRequest>,
    timeout: Duration,
) -> Result<BTreeMap<String, Vec<u8>>, FetchError> {
    // A timeout too large to be represented as an `Instant` means waiting without a deadline.
    let deadline = Instant::now().checked_add(timeout);
    let expected = requests.len();
    let (outcome_sender, outcomes) = mpsc::channel::<FetchOutcome>();

    for (index, request) in requests.into_iter().enumerate() {
        let store = store.clone();
        let outcome_sender = outcome_sender.clone();
        // Variable names are read from the store and may contain bytes that are not valid in a thread
        // name, so threads are named by the request's position instead.
        let thread_name = format!("sysvar-fetch-{}", index);
        let name = request.name.clone();
        thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let outcome = match store.get(request.location.namespace(), request.location.key()) {
                    Ok(value) => Ok((request.name, value)),
                    Err(source) => Err(FetchError::StoreUnavailable {
                        name: request.name,
                        location: request.location,
                        source,
                    }),
                };

                // The receiver is gone if the fetch already failed or timed out. This outcome is
                // then no longer needed.
                let _ = outcome_sender.send(outcome);
            })
            .map_err(|source| FetchError::SpawnFailed { name, source })?;
    }

    // Only the fetch threads hold senders from here on, so the channel disconnects if all of them
    // exit without sending.
    drop(outcome_sender);

    let mut values = BTreeMap::new();
    let mut received = 0;
    while received < expected {
        let outcome = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(abandon(received, expected, timeout));
                }
                outcomes.recv_timeout(deadline - now)
            }
            None => outcomes.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match outcome {
            Ok(Ok((name, value))) => {
                log::trace!("Fetched system variable {} ({} bytes)", name, value.len());
                values.insert(name, value);
                received += 1;
            }
            Ok(Err(err)) => {
                log::debug!(
                    "Fetch failed after {} of {} outcomes: {}",
                    received,
                    expected,
                    err
                );
                return Err(err);
            }
            Err(RecvTimeoutError::Timeout) => return Err(abandon(received, expected, timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(FetchError::Disconnected { received, expected })
            }
        }
    }

    Ok(values)
}

fn abandon(received: usize, expected: usize, timeout: Duration) -> FetchError {
    log::debug!(
        "Fetch timed out after {:?}, abandoning {} in-flight fetches",
        timeout,
        expected - received
    );
    FetchError::Timeout {
        received,
        expected,
        timeout,
    }
}

/// Error when fetching values with [`fetch_all`].
#[derive(Debug)]
pub enum FetchError {
    /// The backing store failed to serve the value of the variable called `name`.
    StoreUnavailable {
        name: String,
        location: NamespacedKey,
        source: StoreError,
    },

    /// Only `received` out of `expected` outcomes arrived before `timeout` elapsed.
    Timeout {
        received: usize,
        expected: usize,
        timeout: Duration,
    },

    /// Some fetch threads exited without reporting an outcome. This happens if a call to the backing
    /// store panics.
    Disconnected { received: usize, expected: usize },

    /// A thread to fetch the variable called `name` could not be spawned.
    SpawnFailed { name: String, source: io::Error },
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::StoreUnavailable {
                name,
                location,
                source,
            } => write!(
                f,
                "failed to fetch system variable {} from {}: {}",
                name, location, source
            ),
            FetchError::Timeout {
                received,
                expected,
                timeout,
            } => write!(
                f,
                "timed out after {:?} with {} of {} values fetched",
                timeout, received, expected
            ),
            FetchError::Disconnected { received, expected } => write!(
                f,
                "fetch threads exited with {} of {} outcomes reported",
                received, expected
            ),
            FetchError::SpawnFailed { name, source } => write!(
                f,
                "failed to spawn fetch thread for system variable {}: {}",
                name, source
            ),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::StoreUnavailable { source, .. } => Some(source),
            FetchError::SpawnFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
