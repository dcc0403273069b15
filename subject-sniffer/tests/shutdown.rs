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


mod support;

use integration_test_utils::{InMemoryBroker, PayloadRecorder};
use std::sync::Arc;
use subject_sniffer::{Sniffer, SnifferConfig, SnifferError};
use support::start_sniffer;

#[tokio::test]
async fn start_against_unreachable_broker_fails() {
    integration_test_utils::init_logging();

    let broker = InMemoryBroker::unreachable();

    let result = Sniffer::start(SnifferConfig::default(), &broker).await;

    assert!(matches!(result, Err(SnifferError::ConnectionError(_))));
}

#[tokio::test]
async fn sniff_after_quit_fails_and_registers_nothing() {
    integration_test_utils::init_logging();

    let broker = InMemoryBroker::new();
    let bus = broker.bus();
    let sniffer = start_sniffer(&broker).await;
    let recorder = PayloadRecorder::new();

    sniffer.quit().await;

    for subject in ["orders.created", "payments.settled", "*"] {
        let result = sniffer.sniff(subject, recorder.handler()).await;
        assert!(matches!(result, Err(SnifferError::ConnectionClosed)));
        assert_eq!(sniffer.handler_count(subject), 0);
    }
    assert_eq!(bus.subscribe_count(), 0);
    assert_eq!(sniffer.subscription_count(), 0);
}

#[tokio::test]
async fn quit_releases_subscriptions_and_drops_handlers() {
    integration_test_utils::init_logging();

    let broker = InMemoryBroker::new();
    let bus = broker.bus();
    let sniffer = start_sniffer(&broker).await;
    let recorder = PayloadRecorder::new();
    let handler = recorder.handler();

    sniffer
        .sniff("orders.created", handler.clone())
        .await
        .expect("sniff orders");
    sniffer
        .sniff("payments.settled", handler.clone())
        .await
        .expect("sniff payments");
    assert_eq!(Arc::strong_count(&handler), 3);

    sniffer.quit().await;

    assert!(sniffer.is_closed());
    assert_eq!(bus.unsubscribe_count(), 2);
    assert_eq!(bus.total_active_subscriptions(), 0);
    assert!(sniffer.handler_counts().is_empty());
    assert_eq!(Arc::strong_count(&handler), 1);
    assert_eq!(bus.publish("orders.created", "after-quit").await, 0);
    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn failed_subscription_reports_subject_and_keeps_other_subjects() {
    integration_test_utils::init_logging();

    let broker = InMemoryBroker::new();
    let bus = broker.bus();
    bus.fail_subject("orders..created");
    let sniffer = start_sniffer(&broker).await;
    let recorder = PayloadRecorder::new();

    sniffer
        .sniff("payments.settled", recorder.handler())
        .await
        .expect("sniff payments");
    let result = sniffer.sniff("orders..created", recorder.handler()).await;

    match result {
        Err(SnifferError::SubscriptionError { subject, .. }) => {
            assert_eq!(subject, "orders..created")
        }
        other => panic!("expected subscription error, got {other:?}"),
    }
    assert_eq!(sniffer.handler_count("orders..created"), 0);
    assert_eq!(sniffer.subscription_count(), 1);
    assert!(!sniffer.is_closed());

    sniffer.quit().await;
}
