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

//! Recording bus doubles shared by unit tests.

use crate::bus::{
    Bus, BusConnector, BusError, BusMessage, BusSubscription, SubjectListener,
};
use crate::config::BusOptions;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Notify;

struct RecordedSubscription {
    subject: String,
    listener: Arc<dyn SubjectListener>,
    active: Arc<AtomicBool>,
}

/// Bus that records calls and delivers messages to exact-subject subscriptions.
#[derive(Default)]
pub(crate) struct RecordingBus {
    subscriptions: StdMutex<Vec<RecordedSubscription>>,
    failing_subjects: StdMutex<HashSet<String>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: Arc<AtomicUsize>,
    closed: AtomicBool,
    hold_subscribes: AtomicBool,
    subscribe_entered: Notify,
    subscribe_resumed: Notify,
}

impl RecordingBus {
    /// Makes the next `subscribe` park after its closed check until [`resume_subscribe`](Self::resume_subscribe).
    pub(crate) fn hold_subscribes(&self) {
        self.hold_subscribes.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn subscribe_entered(&self) {
        self.subscribe_entered.notified().await;
    }

    pub(crate) fn resume_subscribe(&self) {
        self.subscribe_resumed.notify_one();
    }

    pub(crate) fn fail_subject(&self, subject: &str) {
        self.failing_subjects
            .lock()
            .expect("lock failing_subjects")
            .insert(subject.to_string());
    }

    pub(crate) fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed_now(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Delivers `payload` to every active subscription on exactly `subject`.
    pub(crate) async fn deliver(&self, subject: &str, payload: &str) -> usize {
        let listeners: Vec<Arc<dyn SubjectListener>> = self
            .subscriptions
            .lock()
            .expect("lock subscriptions")
            .iter()
            .filter(|recorded| {
                recorded.subject == subject && recorded.active.load(Ordering::SeqCst)
            })
            .map(|recorded| recorded.listener.clone())
            .collect();

        for listener in &listeners {
            listener
                .on_message(BusMessage::new(subject, payload))
                .await;
        }
        listeners.len()
    }
}

struct RecordingSubscription {
    subject: String,
    active: Arc<AtomicBool>,
    unsubscribe_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl BusSubscription for RecordingSubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn unsubscribe(&self) -> Result<(), BusError> {
        self.active.store(false, Ordering::SeqCst);
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Bus for RecordingBus {
    async fn subscribe(
        &self,
        subject: &str,
        listener: Arc<dyn SubjectListener>,
    ) -> Result<Box<dyn BusSubscription>, BusError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);

        if self.is_closed() {
            return Err(BusError::Closed);
        }
        if self.hold_subscribes.swap(false, Ordering::SeqCst) {
            self.subscribe_entered.notify_one();
            self.subscribe_resumed.notified().await;
        }
        if self
            .failing_subjects
            .lock()
            .expect("lock failing_subjects")
            .contains(subject)
        {
            return Err(BusError::InvalidSubject(subject.to_string()));
        }

        let active = Arc::new(AtomicBool::new(true));
        self.subscriptions
            .lock()
            .expect("lock subscriptions")
            .push(RecordedSubscription {
                subject: subject.to_string(),
                listener,
                active: active.clone(),
            });

        Ok(Box::new(RecordingSubscription {
            subject: subject.to_string(),
            active,
            unsubscribe_calls: self.unsubscribe_calls.clone(),
        }))
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector handing out one shared [`RecordingBus`], or failing every connect.
pub(crate) struct RecordingConnector {
    pub(crate) bus: Arc<RecordingBus>,
    pub(crate) reachable: bool,
}

impl RecordingConnector {
    pub(crate) fn new() -> Self {
        Self {
            bus: Arc::new(RecordingBus::default()),
            reachable: true,
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }
}

#[async_trait]
impl BusConnector for RecordingConnector {
    async fn connect(&self, options: &BusOptions) -> Result<Arc<dyn Bus>, BusError> {
        if !self.reachable {
            return Err(BusError::ConnectFailed(options.server_address.clone()));
        }
        Ok(self.bus.clone())
    }
}
