/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Events emitted by a [`SystemVariableCache`](crate::cache::SystemVariableCache).
//!
//! Note: an event for a given action indicates that the action has been completed (or, for
//! [`UpdateCacheFailedEvent`], that it has been abandoned).
//!
//! Library users can register handlers for these events through
//! [`EventHandlers`](crate::event_handlers::EventHandlers). If
//! [`log_events`](crate::config::Configuration::log_events) is set, the default handlers defined in
//! [`logging`](crate::logging) are registered as well.

use std::time::SystemTime;

use crate::types::data_types::{BlockHeight, SnapshotDigest};

/// Every kind of event that a [`SystemVariableCache`](crate::cache::SystemVariableCache) can emit.
pub enum Event {
    UpdateCache(UpdateCacheEvent),
    UpdateCacheFailed(UpdateCacheFailedEvent),
    SetOverride(SetOverrideEvent),
}

/// The cache's snapshot was replaced with the values of all system variables as of `height`.
pub struct UpdateCacheEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub variables: usize,
    pub digest: SnapshotDigest,
}

/// An update of the cache at `height` failed. The cache's snapshot is unchanged.
pub struct UpdateCacheFailedEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub cause: String,
}

/// The value of the variable called `name` was overridden locally.
pub struct SetOverrideEvent {
    pub timestamp: SystemTime,
    pub name: String,
    pub value_len: usize,
}
