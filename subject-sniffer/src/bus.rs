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

//! Publish/subscribe bus abstraction consumed by the [`Sniffer`](crate::Sniffer).
//!
//! The sniffer never talks to a concrete bus client. A [`BusConnector`] opens a
//! [`Bus`] connection; the connection hands out one [`BusSubscription`] per
//! subscribed subject and delivers every matching message to the
//! [`SubjectListener`] given at subscribe time. Wildcard semantics belong to the
//! bus implementation.

use crate::config::BusOptions;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// One message received from the bus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BusMessage {
    /// Concrete subject the message was published on.
    pub subject: String,
    pub payload: String,
}

impl BusMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
        }
    }
}

/// Failures reported by bus implementations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BusError {
    /// The server could not be reached or rejected the connection options.
    ConnectFailed(String),
    /// The connection has been closed.
    Closed,
    /// The subject is not valid for this bus.
    InvalidSubject(String),
    /// The bus refused the operation for another reason.
    Rejected(String),
}

impl Display for BusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::ConnectFailed(reason) => write!(f, "unable to connect to bus: {reason}"),
            BusError::Closed => write!(f, "bus connection is closed"),
            BusError::InvalidSubject(subject) => write!(f, "invalid subject [{subject}]"),
            BusError::Rejected(reason) => write!(f, "bus rejected the operation: {reason}"),
        }
    }
}

impl Error for BusError {}

/// Receives the messages of one upstream subscription, in bus delivery order.
#[async_trait]
pub trait SubjectListener: Send + Sync {
    async fn on_message(&self, message: BusMessage);
}

/// Handle of one active upstream subscription.
#[async_trait]
pub trait BusSubscription: Send + Sync {
    /// Subject pattern this subscription was created for.
    fn subject(&self) -> &str;

    /// Releases the subscription upstream. After it returns no further messages are
    /// delivered to the subscription's listener.
    async fn unsubscribe(&self) -> Result<(), BusError>;
}

/// An open bus connection shared by every subscription of a sniffer.
#[async_trait]
pub trait Bus: Send + Sync {
    async fn subscribe(
        &self,
        subject: &str,
        listener: Arc<dyn SubjectListener>,
    ) -> Result<Box<dyn BusSubscription>, BusError>;

    fn is_closed(&self) -> bool;

    /// Closes the connection. Closing twice is a no-op.
    async fn close(&self);
}

/// Opens bus connections.
#[async_trait]
pub trait BusConnector: Send + Sync {
    async fn connect(&self, options: &BusOptions) -> Result<Arc<dyn Bus>, BusError>;
}
