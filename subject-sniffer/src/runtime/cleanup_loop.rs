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

//! Runtime helper for the periodic subject cleanup loop.

use crate::control_plane::subject_lifecycle::SubjectLifecycle;
use crate::observability::events;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const COMPONENT: &str = "cleanup_loop";

/// Spawns the loop that sweeps idle subjects every `cleanup_interval` until `shutdown`
/// is cancelled, then tears the lifecycle down.
pub(crate) fn spawn_cleanup_loop(
    lifecycle: Arc<SubjectLifecycle>,
    cleanup_interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let handle = tokio::spawn(run_cleanup_loop(lifecycle, cleanup_interval, shutdown));
    debug!(
        event = events::RUNTIME_SPAWN_OK,
        component = COMPONENT,
        cleanup_interval_ms = interval_millis(cleanup_interval),
        "spawned cleanup loop"
    );
    handle
}

fn interval_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

async fn run_cleanup_loop(
    lifecycle: Arc<SubjectLifecycle>,
    cleanup_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + cleanup_interval, cleanup_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                lifecycle.shutdown().await;
                info!(
                    event = events::RUNTIME_LOOP_STOPPED,
                    component = COMPONENT,
                    "cleanup loop stopped"
                );
                return;
            }
            _ = ticker.tick() => {
                lifecycle.reclaim_idle_subjects().await;
            }
        }
    }
}
