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

//! Canonical structured event names used across `subject-sniffer`.

// Sniffer lifecycle events.
pub const SNIFFER_START_OK: &str = "sniffer_start_ok";
pub const SNIFFER_START_FAILED: &str = "sniffer_start_failed";
pub const SNIFFER_QUIT: &str = "sniffer_quit";

// Client-facing sniff/unsniff events.
pub const SNIFF_OK: &str = "sniff_ok";
pub const SNIFF_REJECTED_CLOSED: &str = "sniff_rejected_closed";
pub const SNIFF_ROLLBACK_CLOSED: &str = "sniff_rollback_closed";
pub const UNSNIFF_OK: &str = "unsniff_ok";
pub const UNSNIFF_MISSING: &str = "unsniff_missing";

// Upstream subscription events.
pub const UPSTREAM_SUBSCRIBE_OK: &str = "upstream_subscribe_ok";
pub const UPSTREAM_SUBSCRIBE_FAILED: &str = "upstream_subscribe_failed";
pub const UPSTREAM_UNSUBSCRIBE_OK: &str = "upstream_unsubscribe_ok";
pub const UPSTREAM_UNSUBSCRIBE_FAILED: &str = "upstream_unsubscribe_failed";

// Dispatch events.
pub const DISPATCH_FAN_OUT: &str = "dispatch_fan_out";
pub const DISPATCH_NO_HANDLERS: &str = "dispatch_no_handlers";

// Cleanup loop events.
pub const CLEANUP_SWEEP: &str = "cleanup_sweep";
pub const CLEANUP_RECLAIM_SUBJECT: &str = "cleanup_reclaim_subject";
pub const CLEANUP_SKIP_REVIVED: &str = "cleanup_skip_revived";

// Runtime events.
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_LOOP_STOPPED: &str = "runtime_loop_stopped";
pub const RUNTIME_JOIN_FAILED: &str = "runtime_join_failed";
pub const BUS_CLOSE: &str = "bus_close";
