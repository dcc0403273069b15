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

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:4222";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: usize = 5;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;
pub const DEFAULT_SUBSCRIPTION_BUFFER_SIZE: usize = 8_192;
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 10_000;

/// Sniffer settings, usually loaded from a json5 file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SnifferConfig {
    #[serde(default)]
    pub bus: BusOptions,
    /// Period of the sweep that retires subjects nobody sniffs anymore.
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

/// Bus connection settings handed to a [`BusConnector`](crate::BusConnector).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BusOptions {
    /// `host:port` of the bus server, optionally with credentials (`user:pass@host:port`).
    #[serde(default = "default_server_address")]
    pub server_address: String,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: usize,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Capacity of the internal delivery buffer of each subscription.
    #[serde(default = "default_subscription_buffer_size")]
    pub subscription_buffer_size: usize,
}

fn default_server_address() -> String {
    DEFAULT_SERVER_ADDRESS.to_string()
}

fn default_max_reconnect_attempts() -> usize {
    DEFAULT_MAX_RECONNECT_ATTEMPTS
}

fn default_reconnect_delay_ms() -> u64 {
    DEFAULT_RECONNECT_DELAY_MS
}

fn default_subscription_buffer_size() -> usize {
    DEFAULT_SUBSCRIPTION_BUFFER_SIZE
}

fn default_cleanup_interval_ms() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_MS
}

impl Default for BusOptions {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            subscription_buffer_size: DEFAULT_SUBSCRIPTION_BUFFER_SIZE,
        }
    }
}

impl BusOptions {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            bus: BusOptions::default(),
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
        }
    }
}

impl SnifferConfig {
    /// Default settings pointed at `server_address`.
    pub fn new(server_address: &str) -> Self {
        Self {
            bus: BusOptions {
                server_address: server_address.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval_ms = u64::try_from(cleanup_interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Rejects settings the sniffer cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.cleanup_interval_ms == 0 {
            return Err("cleanup_interval_ms must be greater than zero".to_string());
        }
        if self.bus.subscription_buffer_size == 0 {
            return Err("subscription_buffer_size must be greater than zero".to_string());
        }
        if self.bus.server_address.trim().is_empty() {
            return Err("server_address must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SnifferConfig, DEFAULT_CLEANUP_INTERVAL_MS, DEFAULT_SERVER_ADDRESS};
    use std::time::Duration;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = SnifferConfig::default();

        assert_eq!(config.bus.server_address, DEFAULT_SERVER_ADDRESS);
        assert_eq!(config.bus.max_reconnect_attempts, 5);
        assert_eq!(config.bus.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.bus.subscription_buffer_size, 8_192);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides_address_and_interval() {
        let config = SnifferConfig::new("nats.internal:4222")
            .with_cleanup_interval(Duration::from_millis(250));

        assert_eq!(config.bus.server_address, "nats.internal:4222");
        assert_eq!(config.cleanup_interval_ms, 250);
    }

    #[test]
    fn validate_rejects_zero_interval_and_zero_buffer() {
        let mut config = SnifferConfig::default().with_cleanup_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        config.cleanup_interval_ms = DEFAULT_CLEANUP_INTERVAL_MS;
        config.bus.subscription_buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json5_keeps_defaults_for_missing_fields() {
        let config: SnifferConfig = json5::from_str(
            r#"{
                bus: { server_address: "nats.internal:4222", reconnect_delay_ms: 250 },
            }"#,
        )
        .expect("parse sniffer config");

        assert_eq!(config.bus.server_address, "nats.internal:4222");
        assert_eq!(config.bus.reconnect_delay(), Duration::from_millis(250));
        assert_eq!(config.bus.max_reconnect_attempts, 5);
        assert_eq!(config.cleanup_interval_ms, DEFAULT_CLEANUP_INTERVAL_MS);
    }

    #[test]
    fn unknown_json5_fields_are_rejected() {
        let parsed = json5::from_str::<SnifferConfig>("{ cleanup_interval: 5 }");

        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_blank_server_address() {
        assert!(SnifferConfig::new("  ").validate().is_err());
    }
}
