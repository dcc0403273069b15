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
use std::error::Error;
use subject_sniffer::SnifferConfig;

pub(crate) const DEFAULT_PORT: u16 = 8080;

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ServerConfig {
    #[serde(default = "default_port")]
    pub(crate) port: u16,
    #[serde(default)]
    pub(crate) sniffer: SnifferConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            sniffer: SnifferConfig::default(),
        }
    }
}

impl ServerConfig {
    pub(crate) fn from_file(path: &str) -> Result<Self, Box<dyn Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Unable to read config file {path}: {e}"))?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, Box<dyn Error>> {
        json5::from_str(contents).map_err(|e| format!("Unable to parse config file: {e}").into())
    }

    /// Applies flags given on the command line on top of the file (or default) values.
    pub(crate) fn with_overrides(mut self, port: Option<u16>, nats: Option<String>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(nats) = nats {
            self.sniffer.bus.server_address = nats;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, DEFAULT_PORT};
    use std::time::Duration;
    use subject_sniffer::DEFAULT_SERVER_ADDRESS;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServerConfig::parse("{}").expect("parse empty config");

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.sniffer.bus.server_address, DEFAULT_SERVER_ADDRESS);
    }

    #[test]
    fn nested_sniffer_settings_are_read() {
        let config = ServerConfig::parse(
            r#"{
                // json5 allows comments
                port: 9090,
                sniffer: {
                    cleanup_interval_ms: 2500,
                    bus: { server_address: "nats.internal:4222", max_reconnect_attempts: 10 },
                },
            }"#,
        )
        .expect("parse config");

        assert_eq!(config.port, 9090);
        assert_eq!(config.sniffer.cleanup_interval(), Duration::from_millis(2500));
        assert_eq!(config.sniffer.bus.server_address, "nats.internal:4222");
        assert_eq!(config.sniffer.bus.max_reconnect_attempts, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ServerConfig::parse("{ prot: 8080 }").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let file = r#"{ port: 9090, sniffer: { bus: { server_address: "a:1" } } }"#;
        let config = ServerConfig::parse(file)
            .expect("parse config")
            .with_overrides(Some(7070), Some("b:2".to_string()));

        assert_eq!(config.port, 7070);
        assert_eq!(config.sniffer.bus.server_address, "b:2");
    }

    #[test]
    fn missing_flags_keep_file_values() {
        let config = ServerConfig::parse("{ port: 9090 }")
            .expect("parse config")
            .with_overrides(None, None);

        assert_eq!(config.port, 9090);
        assert_eq!(config.sniffer.bus.server_address, DEFAULT_SERVER_ADDRESS);
    }
}
