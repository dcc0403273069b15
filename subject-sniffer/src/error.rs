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

use crate::bus::BusError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures reported by [`Sniffer`](crate::Sniffer) operations.
#[derive(Debug)]
pub enum SnifferError {
    /// The bus was unreachable or misconfigured at start. Fatal for startup.
    ConnectionError(BusError),
    /// The sniffer configuration is unusable. Fatal for startup.
    InvalidConfiguration(String),
    /// Sniff was attempted after the bus connection closed.
    ConnectionClosed,
    /// The bus rejected the upstream subscription for `subject`.
    SubscriptionError { subject: String, source: BusError },
}

impl Display for SnifferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SnifferError::ConnectionError(err) => write!(f, "bus connection failed: {err}"),
            SnifferError::InvalidConfiguration(reason) => {
                write!(f, "invalid sniffer configuration: {reason}")
            }
            SnifferError::ConnectionClosed => write!(f, "bus connection is closed"),
            SnifferError::SubscriptionError { subject, source } => {
                write!(f, "unable to subscribe to subject [{subject}]: {source}")
            }
        }
    }
}

impl Error for SnifferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SnifferError::ConnectionError(err) => Some(err),
            SnifferError::SubscriptionError { source, .. } => Some(source),
            _ => None,
        }
    }
}
