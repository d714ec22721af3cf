/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A height-synchronized, in-memory cache of system variables.
//!
//! System variables are named configuration values (e.g., fee parameters) that a blockchain node reads
//! frequently, but which are authoritatively stored in a separate, namespaced key-value store. This
//! library keeps a consistent, low-latency snapshot of all system variables in memory, refreshed once
//! per block such that independently operating nodes never disagree about a variable's value within
//! the same block.
//!
//! The components of this library, leaf-first, are:
//! 1. The [location directory](directory), which deterministically resolves where each variable is
//!    stored at a given block height, even while a variable is being moved.
//! 2. The pluggable [backing store](store), from which the directory and the variables are read.
//! 3. The [fan-in fetch](fan_in), which reads many values from the backing store concurrently, as one
//!    all-or-nothing unit bounded by a timeout.
//! 4. The [cache](cache) itself, which owns the snapshot and swaps it atomically on every successful
//!    update.

pub mod cache;

pub mod codec;

pub mod config;

pub mod directory;

pub mod event_handlers;

pub mod events;

pub mod fan_in;

pub mod logging;

pub mod store;

pub mod types;

pub mod variables;
