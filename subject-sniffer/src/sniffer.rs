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

use crate::bus::BusConnector;
use crate::config::SnifferConfig;
use crate::control_plane::subject_lifecycle::SubjectLifecycle;
use crate::error::SnifferError;
use crate::observability::events;
use crate::registry::handler_set::{HandlerId, MessageHandler};
use crate::runtime::cleanup_loop::spawn_cleanup_loop;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const COMPONENT: &str = "sniffer";

/// Subject multiplexer between one bus connection and many message handlers.
///
/// Keeps exactly one upstream subscription per subject no matter how many handlers
/// sniff it, fans every received message out to the subject's current handlers, and
/// retires subjects left without handlers on a periodic cleanup sweep.
///
/// Dropping a `Sniffer` without calling [`quit`](Self::quit) still stops the cleanup
/// loop, which then closes the bus connection in the background.
pub struct Sniffer {
    lifecycle: Arc<SubjectLifecycle>,
    shutdown: CancellationToken,
    cleanup_loop: Mutex<Option<JoinHandle<()>>>,
}

impl Sniffer {
    /// Connects to the bus and starts the cleanup loop.
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// [`SnifferError::ConnectionError`] when the bus cannot be reached; callers should
    /// treat that as fatal and not accept clients.
    pub async fn start(
        config: SnifferConfig,
        connector: &dyn BusConnector,
    ) -> Result<Self, SnifferError> {
        if let Err(reason) = config.validate() {
            error!(
                event = events::SNIFFER_START_FAILED,
                component = COMPONENT,
                reason = reason.as_str(),
                "invalid sniffer configuration"
            );
            return Err(SnifferError::InvalidConfiguration(reason));
        }

        let bus = connector.connect(&config.bus).await.map_err(|err| {
            error!(
                event = events::SNIFFER_START_FAILED,
                component = COMPONENT,
                server_address = config.bus.server_address.as_str(),
                err = %err,
                "unable to connect to bus"
            );
            SnifferError::ConnectionError(err)
        })?;

        let lifecycle = Arc::new(SubjectLifecycle::new(bus));
        let shutdown = CancellationToken::new();
        let cleanup_loop = spawn_cleanup_loop(
            lifecycle.clone(),
            config.cleanup_interval(),
            shutdown.clone(),
        );

        info!(
            event = events::SNIFFER_START_OK,
            component = COMPONENT,
            server_address = config.bus.server_address.as_str(),
            cleanup_interval_ms = config.cleanup_interval_ms,
            "sniffer started"
        );

        Ok(Self {
            lifecycle,
            shutdown,
            cleanup_loop: Mutex::new(Some(cleanup_loop)),
        })
    }

    /// Starts delivering every message on `subject` to `handler`.
    ///
    /// Subscribes upstream the first time a subject is sniffed; later sniffs on the
    /// same subject share that subscription. Concurrent first sniffs on one subject
    /// still create a single subscription. The returned identity is what
    /// [`unsniff`](Self::unsniff) needs to stop delivery.
    pub async fn sniff(
        &self,
        subject: &str,
        handler: MessageHandler,
    ) -> Result<HandlerId, SnifferError> {
        self.lifecycle.sniff(subject, handler).await
    }

    /// Stops delivery to the handler registered as `handler_id`.
    ///
    /// Unknown subjects or identities are ignored. The upstream subscription outlives
    /// its last handler until the next cleanup sweep, so a client that reconnects
    /// quickly reuses it.
    pub fn unsniff(&self, subject: &str, handler_id: &HandlerId) {
        self.lifecycle.unsniff(subject, handler_id);
    }

    /// Stops the cleanup loop and closes the bus connection.
    ///
    /// Every remaining handler is dropped and every later [`sniff`](Self::sniff) fails
    /// with [`SnifferError::ConnectionClosed`]. Handlers already running finish
    /// normally. Calling `quit` again is a no-op.
    pub async fn quit(&self) {
        self.shutdown.cancel();

        let cleanup_loop = self
            .cleanup_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cleanup_loop) = cleanup_loop {
            if let Err(err) = cleanup_loop.await {
                warn!(
                    event = events::RUNTIME_JOIN_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "cleanup loop ended abnormally"
                );
            }
        }

        // Covers a cleanup loop that panicked before it could tear down.
        self.lifecycle.shutdown().await;
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }

    /// Runs one cleanup sweep now instead of waiting for the next tick.
    ///
    /// Returns the number of subjects retired.
    pub async fn reclaim_idle_subjects(&self) -> usize {
        self.lifecycle.reclaim_idle_subjects().await
    }

    /// Subjects with an active upstream subscription.
    pub fn subscribed_subjects(&self) -> HashSet<String> {
        self.lifecycle.subscribed_subjects()
    }

    pub fn subscription_count(&self) -> usize {
        self.lifecycle.subscription_count()
    }

    /// Number of handlers currently registered for `subject`.
    pub fn handler_count(&self, subject: &str) -> usize {
        self.lifecycle.handler_count(subject)
    }

    /// Handler count of every subject still tracked, including idle subjects that
    /// await the next cleanup sweep.
    pub fn handler_counts(&self) -> HashMap<String, usize> {
        self.lifecycle.handler_counts().into_iter().collect()
    }
}

impl Drop for Sniffer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
