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

//! Subject-indexed registries.
//!
//! Everything the sniffer tracks per subject is built on one generic
//! [`Registry`]: handler sets (handler identity to callback) and the
//! subscription table (subject to upstream subscription handle).

pub(crate) mod concurrent_registry;
pub(crate) mod handler_set;
pub(crate) mod subscription_table;
