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


use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use subject_sniffer::MessageHandler;
use tokio::time::Instant;

/// Collects the payloads delivered to the handlers it hands out.
#[derive(Clone, Default)]
pub struct PayloadRecorder {
    payloads: Arc<Mutex<Vec<String>>>,
}

impl PayloadRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> MessageHandler {
        let payloads = self.payloads.clone();
        Arc::new(move |payload: &str| {
            payloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload.to_string());
        })
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Waits until at least `expected` payloads were recorded or `timeout` elapses.
    pub async fn wait_for_count(&self, expected: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count() >= expected {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
