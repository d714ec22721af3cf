/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! User-defined parameters of a [`SystemVariableCache`](crate::cache::SystemVariableCache).
//!
//! The configuration is built using the builder pattern, for example:
//!
//! ```
//! # use std::time::Duration;
//! # use sysvar_cache::config::Configuration;
//! let configuration =
//!     Configuration::builder()
//!     .refresh_timeout(Duration::from_millis(500))
//!     .log_events(true)
//!     .build();
//! ```

use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::{types::data_types::NamespacedKey, variables};

/// Stores the user-defined parameters of a system variable cache, that is:
/// 1. The location in the backing store at which the [location directory](crate::directory) is stored.
/// 2. The refresh timeout, which bounds how long fetching all system variables during a single
///    [update](crate::cache::SystemVariableCache::update) may take.
/// 3. The "Log Events" flag, if set to "true" then logs should be printed.
///
/// ## Refresh timeout
///
/// The refresh timeout only bounds the concurrent fetch of the values of system variables. It does not
/// bound fetching the location directory itself. An update that exceeds the timeout fails and leaves
/// the cache's contents unchanged, so the timeout should be set comfortably below the block time, but
/// above the expected worst case latency of a single read from the backing store.
///
/// ## Log Events
///
/// The cache logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, Debug, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.refresh_timeout(...)`

    Optional:
    - `.directory_location(...)`
    - `.log_events(...)`
"))]
pub struct Configuration {
    #[builder(
        default = variables::location_directory(),
        setter(doc = "Set the location of the location directory. Defaults to `variables::location_directory()`.")
    )]
    pub directory_location: NamespacedKey,
    #[builder(setter(doc = "Set the maximum duration that fetching all system variables may take. Required. A duration too large to be added to the current `Instant`, such as `Duration::MAX`, means no deadline."))]
    pub refresh_timeout: Duration,
    #[builder(default = true, setter(doc = "Enable logging? Defaults to `true`."))]
    pub log_events: bool,
}
