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


mod in_memory_bus;
pub use in_memory_bus::{subject_matches, InMemoryBroker, InMemoryBus};
mod payload_recorder;
pub use payload_recorder::PayloadRecorder;

/// Installs a `tracing` subscriber for the current test binary.
///
/// Safe to call from every test; only the first call takes effect.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
