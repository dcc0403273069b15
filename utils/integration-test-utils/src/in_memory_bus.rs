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


use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use subject_sniffer::{
    Bus, BusConnector, BusError, BusMessage, BusOptions, BusSubscription, SubjectListener,
};
use tracing::debug;

/// Returns whether `subject` is matched by the NATS-style `pattern`.
///
/// `*` matches exactly one token and a trailing `>` matches one or more tokens.
pub fn subject_matches(pattern: &str, subject: &str) -> bool {
    let mut subject_tokens = subject.split('.');
    for token in pattern.split('.') {
        match token {
            ">" => return subject_tokens.next().is_some(),
            "*" => {
                if subject_tokens.next().is_none() {
                    return false;
                }
            }
            literal => {
                if subject_tokens.next() != Some(literal) {
                    return false;
                }
            }
        }
    }
    subject_tokens.next().is_none()
}

struct ActiveSubscription {
    id: u64,
    pattern: String,
    listener: Arc<dyn SubjectListener>,
}

type ActiveSubscriptions = Arc<Mutex<Vec<ActiveSubscription>>>;

/// In-process bus with NATS subject matching and failure injection.
#[derive(Default)]
pub struct InMemoryBus {
    subscriptions: ActiveSubscriptions,
    failing_subjects: Mutex<HashSet<String>>,
    subscribe_delay: Mutex<Option<Duration>>,
    next_id: AtomicU64,
    subscribe_count: AtomicUsize,
    unsubscribe_count: Arc<AtomicUsize>,
    closed: AtomicBool,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later subscribe on exactly `subject` fail with `InvalidSubject`.
    pub fn fail_subject(&self, subject: &str) {
        self.failing_subjects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject.to_string());
    }

    /// Delays every later subscribe, widening the window for racing callers.
    pub fn set_subscribe_delay(&self, delay: Duration) {
        *self
            .subscribe_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    /// Number of subscribe calls received, failed ones included.
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribe_count.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions whose pattern is exactly `pattern`.
    pub fn active_subscriptions(&self, pattern: &str) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|active| active.pattern == pattern)
            .count()
    }

    pub fn total_active_subscriptions(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Publishes `payload` on `subject` and returns how many subscriptions received it.
    pub async fn publish(&self, subject: &str, payload: &str) -> usize {
        if self.closed.load(Ordering::SeqCst) {
            return 0;
        }

        let listeners: Vec<Arc<dyn SubjectListener>> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|active| subject_matches(&active.pattern, subject))
            .map(|active| active.listener.clone())
            .collect();

        debug!(
            subject,
            receivers = listeners.len(),
            "in-memory bus publishing message"
        );
        for listener in &listeners {
            listener
                .on_message(BusMessage::new(subject, payload))
                .await;
        }
        listeners.len()
    }
}

struct InMemorySubscription {
    id: u64,
    subject: String,
    subscriptions: ActiveSubscriptions,
    unsubscribe_count: Arc<AtomicUsize>,
}

#[async_trait]
impl BusSubscription for InMemorySubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn unsubscribe(&self) -> Result<(), BusError> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|active| active.id != self.id);
        self.unsubscribe_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Bus for InMemoryBus {
    async fn subscribe(
        &self,
        subject: &str,
        listener: Arc<dyn SubjectListener>,
    ) -> Result<Box<dyn BusSubscription>, BusError> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);

        let delay = *self
            .subscribe_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let failing = self
            .failing_subjects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(subject);
        if failing || subject.trim().is_empty() {
            return Err(BusError::InvalidSubject(subject.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ActiveSubscription {
                id,
                pattern: subject.to_string(),
                listener,
            });

        Ok(Box::new(InMemorySubscription {
            id,
            subject: subject.to_string(),
            subscriptions: self.subscriptions.clone(),
            unsubscribe_count: self.unsubscribe_count.clone(),
        }))
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Connector that hands out one shared [`InMemoryBus`], or refuses every connect.
pub struct InMemoryBroker {
    bus: Arc<InMemoryBus>,
    reachable: bool,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(InMemoryBus::new()),
            reachable: true,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn bus(&self) -> Arc<InMemoryBus> {
        self.bus.clone()
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusConnector for InMemoryBroker {
    async fn connect(&self, options: &BusOptions) -> Result<Arc<dyn Bus>, BusError> {
        if !self.reachable {
            return Err(BusError::ConnectFailed(format!(
                "nothing listening at {}",
                options.server_address
            )));
        }
        Ok(self.bus.clone())
    }
}
