/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Per-subject set of client message handlers keyed by handler identity.

use crate::registry::concurrent_registry::Registry;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Client callback invoked with the payload of every message on its subject.
pub type MessageHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Opaque, process-unique identity of one registered handler.
///
/// Identities are random (v4) UUIDs rendered in hyphenated form, so they stay unique
/// across subjects and across the whole process lifetime.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct HandlerId(String);

impl HandlerId {
    /// Generates a fresh identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HandlerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HandlerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for HandlerId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// Handlers interested in one subject.
#[derive(Default)]
pub struct HandlerSet {
    handlers: Registry<HandlerId, MessageHandler>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under a freshly generated identity and returns it.
    pub fn register(&self, handler: MessageHandler) -> HandlerId {
        let handler_id = HandlerId::generate();
        self.handlers.set(handler_id.clone(), handler);
        handler_id
    }

    /// Registers `handler` under `handler_id`, silently replacing any handler already
    /// stored under that identity.
    pub fn register_with_id(&self, handler_id: HandlerId, handler: MessageHandler) {
        self.handlers.set(handler_id, handler);
    }

    /// Removes the handler stored under `handler_id`. Returns `false` when there was none.
    pub fn unregister(&self, handler_id: &HandlerId) -> bool {
        self.handlers.get_and_remove(handler_id).is_some()
    }

    pub fn contains(&self, handler_id: &HandlerId) -> bool {
        self.handlers.has(handler_id)
    }

    pub fn count(&self) -> usize {
        self.handlers.count()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the identities currently registered.
    pub fn handler_ids(&self) -> Vec<HandlerId> {
        self.handlers.keys().into_iter().collect()
    }

    /// Returns the handlers registered at the time of the call.
    pub fn snapshot(&self) -> Vec<MessageHandler> {
        self.handlers.values()
    }

    /// Invokes every handler in a snapshot of the set with `payload`.
    ///
    /// The set is only locked while the snapshot is taken; handlers run unlocked, so a
    /// handler may register or unregister on this set without deadlocking. Returns the
    /// number of handlers invoked.
    pub fn dispatch(&self, payload: &str) -> usize {
        let handlers = self.snapshot();
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }
}

impl Debug for HandlerSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("count", &self.count())
            .finish()
    }
}
