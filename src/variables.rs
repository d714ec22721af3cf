/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Well-known locations in the backing store.
//!
//! The location of every system variable is looked up in the [location directory](crate::directory).
//! The directory itself cannot be looked up that way, so it sits at a fixed location that every node
//! agrees on in advance. Deployments that keep the directory elsewhere set
//! [`Configuration::directory_location`](crate::config::Configuration::directory_location).

use crate::types::data_types::NamespacedKey;

/// Namespace reserved for the system variable indirection machinery.
pub const SYSTEM_NAMESPACE: &[u8] = b"sysvar";

/// Key, within [`SYSTEM_NAMESPACE`], of the Borsh-serialized location directory.
pub const LOCATION_DIRECTORY_KEY: &[u8] = b"svi_map";

/// The default location of the location directory.
pub fn location_directory() -> NamespacedKey {
    NamespacedKey::new(SYSTEM_NAMESPACE, LOCATION_DIRECTORY_KEY)
}
