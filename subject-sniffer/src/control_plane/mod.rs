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

//! Control-plane layer.
//!
//! Owns the per-subject critical sections that keep upstream subscription
//! lifecycle transitions (create on first interest, retire on last departure)
//! atomic with respect to each other.

pub(crate) mod subject_gate;
pub(crate) mod subject_lifecycle;
