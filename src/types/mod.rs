//! Types that are used across multiple components of the system variable cache.
//!
//! Types that are specific to a single component, e.g., [`LocationDirectory`](crate::directory::LocationDirectory),
//! live in that component's module.

pub mod data_types;
