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

//! Upstream subscription listener that fans each message out to the subject's handlers.

use crate::bus::{BusMessage, SubjectListener};
use crate::observability::{events, fields};
use crate::registry::concurrent_registry::Registry;
use crate::registry::handler_set::HandlerSet;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, Level};

const COMPONENT: &str = "subject_dispatcher";

/// Subject to handler-set registry shared by the sniffer and its dispatchers.
pub(crate) type HandlerSets = Registry<String, Arc<HandlerSet>>;

/// Listener registered with the bus for one subject.
///
/// Holds the handler-set registry rather than a handler set, so every message is
/// delivered to the handlers registered *at that moment*, including handlers
/// registered after the subscription was created.
pub(crate) struct SubjectDispatcher {
    subject: String,
    handler_sets: Arc<HandlerSets>,
}

impl SubjectDispatcher {
    pub(crate) fn new(subject: &str, handler_sets: Arc<HandlerSets>) -> Self {
        Self {
            subject: subject.to_string(),
            handler_sets,
        }
    }
}

#[async_trait]
impl SubjectListener for SubjectDispatcher {
    async fn on_message(&self, message: BusMessage) {
        let subject = self.subject.as_str();

        let Some(handlers) = self.handler_sets.get(subject) else {
            debug!(
                event = events::DISPATCH_NO_HANDLERS,
                component = COMPONENT,
                subject,
                msg_subject = message.subject.as_str(),
                reason = fields::REASON_MISSING_SUBJECT,
                "dropping message for subject without handler set"
            );
            return;
        };

        let delivered = handlers.dispatch(&message.payload);

        if tracing::enabled!(Level::DEBUG) {
            let payload = fields::format_payload_preview(&message.payload);
            debug!(
                event = events::DISPATCH_FAN_OUT,
                component = COMPONENT,
                subject,
                msg_subject = message.subject.as_str(),
                handler_count = delivered,
                payload = payload.as_str(),
                "dispatched message to subject handlers"
            );
        }
    }
}
