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


//! Prints every message published on a NATS subject pattern until Ctrl-C.

use async_trait::async_trait;
use bus_nats::NatsConnector;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use subject_sniffer::{
    BusConnector, BusMessage, BusOptions, SubjectListener, DEFAULT_SERVER_ADDRESS,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Prints the messages published on a NATS subject")]
struct SniffArgs {
    /// NATS address (user:pass@host:port) to connect to
    #[arg(long, default_value = DEFAULT_SERVER_ADDRESS)]
    server: String,
    /// Subject to sniff, wildcards allowed
    #[arg(long, default_value = "*")]
    subject: String,
}

struct PrintingListener;

#[async_trait]
impl SubjectListener for PrintingListener {
    async fn on_message(&self, message: BusMessage) {
        println!("[{}] -> {}", message.subject, message.payload);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let args = SniffArgs::parse();
    let options = BusOptions {
        server_address: args.server,
        ..BusOptions::default()
    };

    let bus = NatsConnector::new().connect(&options).await?;
    let subscription = bus
        .subscribe(&args.subject, Arc::new(PrintingListener))
        .await?;
    info!(
        subject = args.subject.as_str(),
        "Sniffing, press CTRL+C to quit"
    );

    tokio::signal::ctrl_c().await?;

    subscription.unsubscribe().await?;
    bus.close().await;
    Ok(())
}
