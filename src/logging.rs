/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the cache's
//! [configuration](crate::config::Configuration::log_events).
//!
//! The cache logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how an [UpdateCache](crate::events::UpdateCacheEvent) is printed:
//!
//! ```text
//! UpdateCache, 1701329264, 1024, 12, fNGCJyk
//! ```
//!
//! In the snippet:
//! - The third value is the height the cache was updated at.
//! - The fourth value is the number of system variables in the new snapshot.
//! - The fifth value is the first seven characters of the Base64 encoding of the new snapshot's digest.
//!
//! Failed updates and local overrides are logged at the `warn` level. Successful updates are logged at
//! the `info` level.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const UPDATE_CACHE: &str = "UpdateCache";
pub const UPDATE_CACHE_FAILED: &str = "UpdateCacheFailed";
pub const SET_OVERRIDE: &str = "SetOverride";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync>;
}

impl Logger for UpdateCacheEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |update_cache_event: &UpdateCacheEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                UPDATE_CACHE,
                secs_since_unix_epoch(update_cache_event.timestamp),
                update_cache_event.height,
                update_cache_event.variables,
                first_seven_base64_chars(&update_cache_event.digest.bytes())
            )
        };
        Box::new(logger)
    }
}

impl Logger for UpdateCacheFailedEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |update_cache_failed_event: &UpdateCacheFailedEvent| {
            log::warn!(
                "{}, {}, {}, {}",
                UPDATE_CACHE_FAILED,
                secs_since_unix_epoch(update_cache_failed_event.timestamp),
                update_cache_failed_event.height,
                update_cache_failed_event.cause
            )
        };
        Box::new(logger)
    }
}

impl Logger for SetOverrideEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send + Sync> {
        let logger = |set_override_event: &SetOverrideEvent| {
            log::warn!(
                "{}, {}, {}, {}",
                SET_OVERRIDE,
                secs_since_unix_epoch(set_override_event.timestamp),
                set_override_event.name,
                set_override_event.value_len
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7 characters.
pub(crate) fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

// Events are emitted with `SystemTime::now()`, so a timestamp before the Unix Epoch means the system clock is
// set before 1970. Such timestamps are printed as 0.
fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
