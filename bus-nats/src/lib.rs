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


//! NATS implementation of the `subject-sniffer` bus traits, backed by `async-nats`.
//!
//! Every subscription gets its own delivery task that forwards messages to the
//! subscription's listener in the order the server delivered them.

use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use subject_sniffer::{
    Bus, BusConnector, BusError, BusMessage, BusOptions, BusSubscription, SubjectListener,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "bus_nats";
const NATS_SCHEME: &str = "nats://";

const EVENT_CONNECT_OK: &str = "nats_connect_ok";
const EVENT_CONNECT_FAILED: &str = "nats_connect_failed";
const EVENT_CONNECTION: &str = "nats_connection_event";
const EVENT_DELIVERY_STOPPED: &str = "nats_delivery_stopped";
const EVENT_UNSUBSCRIBE_FAILED: &str = "nats_unsubscribe_failed";
const EVENT_FLUSH_FAILED: &str = "nats_flush_failed";

/// Prefixes `address` with the `nats://` scheme unless it already names a scheme.
pub fn server_url(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{NATS_SCHEME}{address}")
    }
}

/// Rejects subjects NATS would refuse: empty subjects, whitespace and empty tokens.
pub fn validate_subject(subject: &str) -> Result<(), BusError> {
    let invalid = subject.is_empty()
        || subject.chars().any(char::is_whitespace)
        || subject.split('.').any(str::is_empty);
    if invalid {
        return Err(BusError::InvalidSubject(subject.to_string()));
    }
    Ok(())
}

/// Opens [`NatsBus`] connections.
#[derive(Clone, Debug, Default)]
pub struct NatsConnector;

impl NatsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BusConnector for NatsConnector {
    async fn connect(&self, options: &BusOptions) -> Result<Arc<dyn Bus>, BusError> {
        let url = server_url(&options.server_address);
        let reconnect_delay = options.reconnect_delay();

        let client = ConnectOptions::new()
            .max_reconnects(options.max_reconnect_attempts)
            .reconnect_delay_callback(move |_attempts| reconnect_delay)
            .subscription_capacity(options.subscription_buffer_size)
            .event_callback(|event| async move {
                info!(
                    event = EVENT_CONNECTION,
                    component = COMPONENT,
                    connection_event = %event,
                    "nats connection event"
                );
            })
            .connect(url.as_str())
            .await
            .map_err(|err| {
                warn!(
                    event = EVENT_CONNECT_FAILED,
                    component = COMPONENT,
                    server_url = url.as_str(),
                    err = %err,
                    "unable to connect to nats server"
                );
                BusError::ConnectFailed(format!("{url}: {err}"))
            })?;

        info!(
            event = EVENT_CONNECT_OK,
            component = COMPONENT,
            server_url = url.as_str(),
            max_reconnect_attempts = options.max_reconnect_attempts,
            subscription_buffer_size = options.subscription_buffer_size,
            "connected to nats server"
        );
        Ok(Arc::new(NatsBus::new(client)))
    }
}

/// One NATS connection shared by all subscriptions of a sniffer.
pub struct NatsBus {
    client: Mutex<Option<Client>>,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl NatsBus {
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    fn client(&self) -> Option<Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Bus for NatsBus {
    async fn subscribe(
        &self,
        subject: &str,
        listener: Arc<dyn SubjectListener>,
    ) -> Result<Box<dyn BusSubscription>, BusError> {
        validate_subject(subject)?;
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let client = self.client().ok_or(BusError::Closed)?;

        let subscriber = client
            .subscribe(subject.to_string())
            .await
            .map_err(|err| BusError::Rejected(err.to_string()))?;

        let stop = self.shutdown.child_token();
        let delivery = tokio::spawn(deliver_messages(
            subject.to_string(),
            subscriber,
            listener,
            stop.clone(),
        ));

        Ok(Box::new(NatsSubscription {
            subject: subject.to_string(),
            stop,
            delivery: Mutex::new(Some(delivery)),
        }))
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.cancel();

        let client = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(client) = client {
            if let Err(err) = client.flush().await {
                debug!(
                    event = EVENT_FLUSH_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "unable to flush nats connection before close"
                );
            }
        }
    }
}

async fn deliver_messages(
    subject: String,
    mut subscriber: Subscriber,
    listener: Arc<dyn SubjectListener>,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => {
                if let Err(err) = subscriber.unsubscribe().await {
                    debug!(
                        event = EVENT_UNSUBSCRIBE_FAILED,
                        component = COMPONENT,
                        subject = subject.as_str(),
                        err = %err,
                        "unable to unsubscribe from nats subject"
                    );
                }
                break;
            }
            message = subscriber.next() => {
                let Some(message) = message else {
                    break;
                };
                let payload = String::from_utf8_lossy(&message.payload).into_owned();
                listener
                    .on_message(BusMessage::new(message.subject.to_string(), payload))
                    .await;
            }
        }
    }

    debug!(
        event = EVENT_DELIVERY_STOPPED,
        component = COMPONENT,
        subject = subject.as_str(),
        "nats delivery task stopped"
    );
}

/// Subscription handle whose delivery task stops on [`unsubscribe`](BusSubscription::unsubscribe).
pub struct NatsSubscription {
    subject: String,
    stop: CancellationToken,
    delivery: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl BusSubscription for NatsSubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn unsubscribe(&self) -> Result<(), BusError> {
        self.stop.cancel();

        let delivery = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(delivery) = delivery {
            delivery
                .await
                .map_err(|err| BusError::Rejected(format!("delivery task failed: {err}")))?;
        }
        Ok(())
    }
}

impl Drop for NatsSubscription {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
