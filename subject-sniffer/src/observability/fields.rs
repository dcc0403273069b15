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

//! Canonical `reason` field values and value-format helpers.

pub const REASON_BUS_CLOSED: &str = "bus_closed";
pub const REASON_MISSING_SUBJECT: &str = "missing_subject";
pub const REASON_MISSING_HANDLER: &str = "missing_handler";
pub const REASON_QUIT: &str = "quit";

/// Upper bound on payload characters rendered into debug events.
pub const PAYLOAD_PREVIEW_MAX_CHARS: usize = 64;

/// Renders a bounded, single-line preview of a message payload for debug logs.
pub fn format_payload_preview(payload: &str) -> String {
    let mut preview: String = payload
        .chars()
        .take(PAYLOAD_PREVIEW_MAX_CHARS)
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();

    if payload.chars().count() > PAYLOAD_PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{format_payload_preview, PAYLOAD_PREVIEW_MAX_CHARS};

    #[test]
    fn payload_preview_keeps_short_payloads_verbatim() {
        assert_eq!(format_payload_preview("order 42"), "order 42");
    }

    #[test]
    fn payload_preview_flattens_control_characters() {
        assert_eq!(format_payload_preview("a\nb\r\tc"), "a b  c");
    }

    #[test]
    fn payload_preview_truncates_long_payloads() {
        let payload = "x".repeat(PAYLOAD_PREVIEW_MAX_CHARS + 10);
        let preview = format_payload_preview(&payload);

        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), PAYLOAD_PREVIEW_MAX_CHARS + 3);
    }
}
