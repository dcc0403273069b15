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


use integration_test_utils::InMemoryBroker;
use std::time::Duration;
use subject_sniffer::{Sniffer, SnifferConfig};

pub(crate) const CLEANUP_INTERVAL: Duration = Duration::from_millis(100);
#[allow(dead_code)]
pub(crate) const DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) async fn start_sniffer(broker: &InMemoryBroker) -> Sniffer {
    let config = SnifferConfig::default().with_cleanup_interval(CLEANUP_INTERVAL);
    Sniffer::start(config, broker)
        .await
        .expect("sniffer should start against a reachable broker")
}

/// Sleeps long enough for at least one cleanup sweep to run.
#[allow(dead_code)]
pub(crate) async fn wait_for_cleanup_sweep() {
    tokio::time::sleep(CLEANUP_INTERVAL * 2 + Duration::from_millis(10)).await;
}
