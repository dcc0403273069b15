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


//! # subject-sniffer
//!
//! `subject-sniffer` multiplexes one pub/sub bus connection across many message
//! handlers. Each subject is subscribed upstream once, however many handlers sniff
//! it, and every message received on it is fanned out to all of the subject's current
//! handlers. Subjects nobody listens to anymore are retired by a periodic cleanup loop.
//!
//! The bus itself sits behind the [`Bus`] and [`BusConnector`] traits so transports
//! such as NATS plug in from their own crates.
//!
//! ```
//! use std::sync::Arc;
//! use subject_sniffer::{Sniffer, SnifferConfig};
//!
//! # pub mod mock_bus {
//! #     use std::sync::Arc;
//! #     use async_trait::async_trait;
//! #     use subject_sniffer::{
//! #         Bus, BusConnector, BusError, BusOptions, BusSubscription, SubjectListener,
//! #     };
//! #
//! #     pub struct MockSubscription(pub String);
//! #
//! #     #[async_trait]
//! #     impl BusSubscription for MockSubscription {
//! #         fn subject(&self) -> &str { &self.0 }
//! #         async fn unsubscribe(&self) -> Result<(), BusError> { Ok(()) }
//! #     }
//! #
//! #     pub struct MockBus;
//! #
//! #     #[async_trait]
//! #     impl Bus for MockBus {
//! #         async fn subscribe(
//! #             &self,
//! #             subject: &str,
//! #             _listener: Arc<dyn SubjectListener>,
//! #         ) -> Result<Box<dyn BusSubscription>, BusError> {
//! #             Ok(Box::new(MockSubscription(subject.to_string())))
//! #         }
//! #         fn is_closed(&self) -> bool { false }
//! #         async fn close(&self) {}
//! #     }
//! #
//! #     pub struct MockConnector;
//! #
//! #     #[async_trait]
//! #     impl BusConnector for MockConnector {
//! #         async fn connect(&self, _options: &BusOptions) -> Result<Arc<dyn Bus>, BusError> {
//! #             Ok(Arc::new(MockBus))
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let sniffer = Sniffer::start(SnifferConfig::new("localhost:4222"), &mock_bus::MockConnector)
//!     .await
//!     .unwrap();
//!
//! let first = sniffer
//!     .sniff("orders.*", Arc::new(|payload: &str| println!("first: {payload}")))
//!     .await
//!     .unwrap();
//! let _second = sniffer
//!     .sniff("orders.*", Arc::new(|payload: &str| println!("second: {payload}")))
//!     .await
//!     .unwrap();
//! assert_eq!(sniffer.subscription_count(), 1);
//! assert_eq!(sniffer.handler_count("orders.*"), 2);
//!
//! sniffer.unsniff("orders.*", &first);
//! sniffer.quit().await;
//! assert!(sniffer.is_closed());
//! # });
//! ```

mod bus;
mod config;
mod control_plane;
mod data_plane;
mod error;
#[doc(hidden)]
pub mod observability;
mod registry;
mod runtime;
mod sniffer;

#[cfg(test)]
mod test_support;

pub use bus::{Bus, BusConnector, BusError, BusMessage, BusSubscription, SubjectListener};
pub use config::{
    BusOptions, SnifferConfig, DEFAULT_CLEANUP_INTERVAL_MS, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_DELAY_MS, DEFAULT_SERVER_ADDRESS, DEFAULT_SUBSCRIPTION_BUFFER_SIZE,
};
pub use error::SnifferError;
pub use registry::concurrent_registry::{Registry, SameValue};
pub use registry::handler_set::{HandlerId, HandlerSet, MessageHandler};
pub use sniffer::Sniffer;
