/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Registration and firing of handlers for [events](crate::events).
//!
//! Handlers are fired synchronously, on the thread that caused the event, after the action that the
//! event describes has completed. For [`UpdateCacheEvent`] this means handlers run after the write lock
//! on the snapshot is released, so handlers may read from the cache.

use crate::{events::*, logging::Logger};

pub type HandlerPtr<T> = Box<dyn Fn(&T) + Send + Sync>;

/// User-defined handlers for each kind of [`Event`].
#[derive(Default)]
pub struct EventHandlers {
    pub(crate) update_cache_handlers: Vec<HandlerPtr<UpdateCacheEvent>>,
    pub(crate) update_cache_failed_handlers: Vec<HandlerPtr<UpdateCacheFailedEvent>>,
    pub(crate) set_override_handlers: Vec<HandlerPtr<SetOverrideEvent>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update_cache(mut self, handler: impl Fn(&UpdateCacheEvent) + Send + Sync + 'static) -> Self {
        self.update_cache_handlers.push(Box::new(handler));
        self
    }

    pub fn on_update_cache_failed(
        mut self,
        handler: impl Fn(&UpdateCacheFailedEvent) + Send + Sync + 'static,
    ) -> Self {
        self.update_cache_failed_handlers.push(Box::new(handler));
        self
    }

    pub fn on_set_override(mut self, handler: impl Fn(&SetOverrideEvent) + Send + Sync + 'static) -> Self {
        self.set_override_handlers.push(Box::new(handler));
        self
    }

    /// Register the default logging handlers for every kind of event.
    pub(crate) fn with_loggers(mut self) -> Self {
        self.update_cache_handlers.push(UpdateCacheEvent::get_logger());
        self.update_cache_failed_handlers
            .push(UpdateCacheFailedEvent::get_logger());
        self.set_override_handlers.push(SetOverrideEvent::get_logger());
        self
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::UpdateCache(update_cache_event) => self
                .update_cache_handlers
                .iter()
                .for_each(|handler| handler(&update_cache_event)),

            Event::UpdateCacheFailed(update_cache_failed_event) => self
                .update_cache_failed_handlers
                .iter()
                .for_each(|handler| handler(&update_cache_failed_event)),

            Event::SetOverride(set_override_event) => self
                .set_override_handlers
                .iter()
                .for_each(|handler| handler(&set_override_event)),
        }
    }
}
