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

//! Subject lifecycle orchestration across the bus, subscription table and handler sets.

use crate::bus::{Bus, BusError, BusSubscription};
use crate::control_plane::subject_gate::SubjectGates;
use crate::data_plane::subject_dispatcher::{HandlerSets, SubjectDispatcher};
use crate::error::SnifferError;
use crate::observability::{events, fields};
use crate::registry::handler_set::{HandlerId, HandlerSet, MessageHandler};
use crate::registry::subscription_table::SubscriptionTable;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "subject_lifecycle";

/// Owner of all per-subject state of one sniffer.
pub(crate) struct SubjectLifecycle {
    bus: Arc<dyn Bus>,
    subscriptions: SubscriptionTable,
    handler_sets: Arc<HandlerSets>,
    gates: SubjectGates,
}

impl SubjectLifecycle {
    pub(crate) fn new(bus: Arc<dyn Bus>) -> Self {
        Self {
            bus,
            subscriptions: SubscriptionTable::new(),
            handler_sets: Arc::new(HandlerSets::new()),
            gates: SubjectGates::new(),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.bus.is_closed()
    }

    /// Registers `handler` for `subject`, subscribing upstream on first interest.
    pub(crate) async fn sniff(
        &self,
        subject: &str,
        handler: MessageHandler,
    ) -> Result<HandlerId, SnifferError> {
        if self.bus.is_closed() {
            warn!(
                event = events::SNIFF_REJECTED_CLOSED,
                component = COMPONENT,
                subject,
                reason = fields::REASON_BUS_CLOSED,
                "rejecting sniff on closed bus connection"
            );
            return Err(SnifferError::ConnectionClosed);
        }

        let guard = self.gates.acquire(subject).await;

        if !self.subscriptions.has(subject) {
            if let Err(err) = self.subscribe_upstream(subject).await {
                if !self.handler_sets.has(subject) {
                    guard.retire();
                }
                return Err(err);
            }
        }

        let handlers = self
            .handler_sets
            .get_or_insert_with(subject.to_string(), || Arc::new(HandlerSet::new()));
        let handler_id = handlers.register(handler);

        // A quit that raced with this call may already have torn the subject down.
        if self.bus.is_closed() {
            handlers.unregister(&handler_id);
            if handlers.is_empty() {
                self.handler_sets.remove_with_value(subject, &handlers);
            }
            if !self.handler_sets.has(subject) && !self.subscriptions.has(subject) {
                guard.retire();
            }
            warn!(
                event = events::SNIFF_ROLLBACK_CLOSED,
                component = COMPONENT,
                subject,
                handler_id = handler_id.as_str(),
                reason = fields::REASON_BUS_CLOSED,
                "rolled back handler registered while bus connection closed"
            );
            return Err(SnifferError::ConnectionClosed);
        }
        drop(guard);

        debug!(
            event = events::SNIFF_OK,
            component = COMPONENT,
            subject,
            handler_id = handler_id.as_str(),
            handler_count = handlers.count(),
            "registered subject handler"
        );
        Ok(handler_id)
    }

    async fn subscribe_upstream(&self, subject: &str) -> Result<(), SnifferError> {
        if self.bus.is_closed() {
            return Err(SnifferError::ConnectionClosed);
        }

        let dispatcher = Arc::new(SubjectDispatcher::new(subject, self.handler_sets.clone()));

        match self.bus.subscribe(subject, dispatcher).await {
            Ok(subscription) => {
                let subscription: Arc<dyn BusSubscription> = Arc::from(subscription);
                if self.bus.is_closed() {
                    self.release(subject, subscription).await;
                    return Err(self.closed_during_subscribe(subject));
                }

                self.subscriptions.insert(subject, subscription);
                // Shutdown may have closed the bus between the check above and the insert.
                if self.bus.is_closed() {
                    if let Some(subscription) = self.subscriptions.take(subject) {
                        self.release(subject, subscription).await;
                    }
                    return Err(self.closed_during_subscribe(subject));
                }

                info!(
                    event = events::UPSTREAM_SUBSCRIBE_OK,
                    component = COMPONENT,
                    subject,
                    subscription_count = self.subscriptions.count(),
                    "subscribed to subject"
                );
                Ok(())
            }
            Err(BusError::Closed) => {
                warn!(
                    event = events::UPSTREAM_SUBSCRIBE_FAILED,
                    component = COMPONENT,
                    subject,
                    reason = fields::REASON_BUS_CLOSED,
                    "unable to subscribe on closed bus connection"
                );
                Err(SnifferError::ConnectionClosed)
            }
            Err(err) => {
                warn!(
                    event = events::UPSTREAM_SUBSCRIBE_FAILED,
                    component = COMPONENT,
                    subject,
                    err = %err,
                    "unable to subscribe to subject"
                );
                Err(SnifferError::SubscriptionError {
                    subject: subject.to_string(),
                    source: err,
                })
            }
        }
    }

    fn closed_during_subscribe(&self, subject: &str) -> SnifferError {
        warn!(
            event = events::UPSTREAM_SUBSCRIBE_FAILED,
            component = COMPONENT,
            subject,
            reason = fields::REASON_BUS_CLOSED,
            "bus connection closed while subscribing"
        );
        SnifferError::ConnectionClosed
    }

    /// Removes one handler. Unknown subjects and identities are ignored.
    ///
    /// Leaves the upstream subscription in place even when the last handler goes;
    /// [`reclaim_idle_subjects`](Self::reclaim_idle_subjects) retires it later.
    pub(crate) fn unsniff(&self, subject: &str, handler_id: &HandlerId) -> bool {
        let Some(handlers) = self.handler_sets.get(subject) else {
            debug!(
                event = events::UNSNIFF_MISSING,
                component = COMPONENT,
                subject,
                handler_id = handler_id.as_str(),
                reason = fields::REASON_MISSING_SUBJECT,
                "unsniff for subject without handlers"
            );
            return false;
        };

        if !handlers.unregister(handler_id) {
            debug!(
                event = events::UNSNIFF_MISSING,
                component = COMPONENT,
                subject,
                handler_id = handler_id.as_str(),
                reason = fields::REASON_MISSING_HANDLER,
                "unsniff for unknown handler"
            );
            return false;
        }

        debug!(
            event = events::UNSNIFF_OK,
            component = COMPONENT,
            subject,
            handler_id = handler_id.as_str(),
            handler_count = handlers.count(),
            "removed subject handler"
        );
        true
    }

    /// Retires every subject whose handler set is empty. Returns how many were retired.
    pub(crate) async fn reclaim_idle_subjects(&self) -> usize {
        let mut reclaimed = 0;

        for (subject, handlers) in self.handler_sets.iter() {
            if !handlers.is_empty() {
                continue;
            }

            let guard = self.gates.acquire(&subject).await;

            let Some(current) = self.handler_sets.get(&subject) else {
                if !self.subscriptions.has(&subject) {
                    guard.retire();
                }
                continue;
            };

            if !current.is_empty() {
                debug!(
                    event = events::CLEANUP_SKIP_REVIVED,
                    component = COMPONENT,
                    subject = subject.as_str(),
                    handler_count = current.count(),
                    "subject gained handlers before it could be retired"
                );
                continue;
            }

            if let Some(subscription) = self.subscriptions.take(&subject) {
                self.release(&subject, subscription).await;
            }
            self.handler_sets
                .remove_with_value(subject.as_str(), &current);
            guard.retire();
            reclaimed += 1;

            info!(
                event = events::CLEANUP_RECLAIM_SUBJECT,
                component = COMPONENT,
                subject = subject.as_str(),
                "retired subject without handlers"
            );
        }

        debug!(
            event = events::CLEANUP_SWEEP,
            component = COMPONENT,
            reclaimed,
            subscription_count = self.subscriptions.count(),
            "cleanup sweep finished"
        );
        reclaimed
    }

    async fn release(&self, subject: &str, subscription: Arc<dyn BusSubscription>) {
        match subscription.unsubscribe().await {
            Ok(()) => debug!(
                event = events::UPSTREAM_UNSUBSCRIBE_OK,
                component = COMPONENT,
                subject,
                "unsubscribed from subject"
            ),
            Err(err) => warn!(
                event = events::UPSTREAM_UNSUBSCRIBE_FAILED,
                component = COMPONENT,
                subject,
                err = %err,
                "unable to unsubscribe from subject"
            ),
        }
    }

    /// Releases every subscription, closes the bus and drops every handler.
    ///
    /// Dropping the handlers lets transports holding the receiving end of a handler's
    /// channel observe end-of-stream. Safe to call more than once.
    pub(crate) async fn shutdown(&self) {
        for (subject, subscription) in self.subscriptions.drain() {
            self.release(&subject, subscription).await;
        }

        if !self.bus.is_closed() {
            info!(
                event = events::BUS_CLOSE,
                component = COMPONENT,
                reason = fields::REASON_QUIT,
                "closing bus connection"
            );
        }
        self.bus.close().await;

        // Sniffs racing with the first drain may have inserted after it.
        for (subject, subscription) in self.subscriptions.drain() {
            self.release(&subject, subscription).await;
        }
        let dropped_subjects = self.handler_sets.clear().len();

        info!(
            event = events::SNIFFER_QUIT,
            component = COMPONENT,
            dropped_subjects,
            "sniffer stopped"
        );
    }

    pub(crate) fn subscribed_subjects(&self) -> HashSet<String> {
        self.subscriptions.subjects()
    }

    pub(crate) fn subscription_count(&self) -> usize {
        self.subscriptions.count()
    }

    pub(crate) fn handler_count(&self, subject: &str) -> usize {
        self.handler_sets
            .get(subject)
            .map(|handlers| handlers.count())
            .unwrap_or(0)
    }

    pub(crate) fn handler_counts(&self) -> Vec<(String, usize)> {
        self.handler_sets
            .iter()
            .into_iter()
            .map(|(subject, handlers)| (subject, handlers.count()))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn gate_count(&self) -> usize {
        self.gates.count()
    }
}
