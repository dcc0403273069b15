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

//! Subject to upstream subscription ownership table.

use crate::bus::BusSubscription;
use crate::registry::concurrent_registry::Registry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Active upstream subscriptions keyed by subject.
///
/// Holds at most one subscription per subject. The table does not serialize
/// check-then-insert on its own; callers do that under the subject's gate.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    subscriptions: Registry<String, Arc<dyn BusSubscription>>,
}

impl SubscriptionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn has(&self, subject: &str) -> bool {
        self.subscriptions.has(subject)
    }

    pub(crate) fn insert(&self, subject: &str, subscription: Arc<dyn BusSubscription>) {
        self.subscriptions.set(subject.to_string(), subscription);
    }

    /// Removes and returns the subscription for `subject`, leaving the caller as its
    /// only owner so it is released exactly once.
    pub(crate) fn take(&self, subject: &str) -> Option<Arc<dyn BusSubscription>> {
        self.subscriptions.get_and_remove(subject)
    }

    pub(crate) fn subjects(&self) -> HashSet<String> {
        self.subscriptions.keys()
    }

    pub(crate) fn count(&self) -> usize {
        self.subscriptions.count()
    }

    /// Removes every subscription and returns them.
    pub(crate) fn drain(&self) -> HashMap<String, Arc<dyn BusSubscription>> {
        self.subscriptions.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionTable;
    use crate::bus::{BusError, BusSubscription};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopSubscription {
        subject: String,
    }

    #[async_trait]
    impl BusSubscription for NoopSubscription {
        fn subject(&self) -> &str {
            &self.subject
        }

        async fn unsubscribe(&self) -> Result<(), BusError> {
            Ok(())
        }
    }

    fn subscription(subject: &str) -> Arc<dyn BusSubscription> {
        Arc::new(NoopSubscription {
            subject: subject.to_string(),
        })
    }

    #[test]
    fn take_hands_out_the_subscription_once() {
        let table = SubscriptionTable::new();
        table.insert("orders.created", subscription("orders.created"));

        assert!(table.has("orders.created"));
        let taken = table.take("orders.created").expect("subscription present");
        assert_eq!(taken.subject(), "orders.created");
        assert!(table.take("orders.created").is_none());
        assert_eq!(table.count(), 0);
    }

    #[test]
    fn drain_empties_the_table() {
        let table = SubscriptionTable::new();
        table.insert("a", subscription("a"));
        table.insert("b", subscription("b"));

        assert_eq!(table.subjects().len(), 2);

        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(table.count(), 0);
    }
}
