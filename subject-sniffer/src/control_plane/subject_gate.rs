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

//! Per-subject critical sections for subscription creation and retirement.

use crate::registry::concurrent_registry::{Registry, SameValue};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Gate = Arc<Mutex<()>>;

/// Registry of one async mutex per subject with lifecycle work in flight.
///
/// Sniff's check-then-subscribe and the cleanup sweep's check-then-retire both run
/// while holding the subject's gate, so at most one upstream subscription exists per
/// subject and a subject is never retired underneath a concurrent sniff. Different
/// subjects use different gates and proceed in parallel.
#[derive(Default)]
pub(crate) struct SubjectGates {
    gates: Registry<String, Gate>,
}

/// Exclusive hold on one subject's gate.
pub(crate) struct SubjectGuard<'a> {
    gates: &'a SubjectGates,
    subject: String,
    gate: Gate,
    _held: OwnedMutexGuard<()>,
}

impl SubjectGates {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `subject`.
    pub(crate) async fn acquire(&self, subject: &str) -> SubjectGuard<'_> {
        loop {
            let gate = self
                .gates
                .get_or_insert_with(subject.to_string(), || Arc::new(Mutex::new(())));
            let held = gate.clone().lock_owned().await;

            // The previous holder may have retired this gate while we waited; the
            // registry then holds a newer gate (or none) and we must queue on that one.
            let current = self
                .gates
                .get(subject)
                .is_some_and(|current| current.same_value(&gate));
            if current {
                return SubjectGuard {
                    gates: self,
                    subject: subject.to_string(),
                    gate,
                    _held: held,
                };
            }
        }
    }

    /// Number of subjects with a live gate.
    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.gates.count()
    }
}

impl SubjectGuard<'_> {
    /// Drops the subject's gate from the registry, then releases it.
    ///
    /// Called once a subject is fully retired so gates do not accumulate for subjects
    /// nobody watches anymore.
    pub(crate) fn retire(self) {
        self.gates
            .gates
            .remove_with_value(self.subject.as_str(), &self.gate);
    }
}
