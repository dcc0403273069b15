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


mod broker;
mod config;

use crate::config::ServerConfig;
use bus_nats::NatsConnector;
use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use subject_sniffer::Sniffer;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Streams NATS subjects to browsers over server-sent events")]
struct SnifferArgs {
    /// Port to listen to for client requests [default: 8080]
    #[arg(long)]
    port: Option<u16>,
    /// NATS address (user:pass@host:port) to connect to for sniffing [default: localhost:4222]
    #[arg(long, value_name = "ADDRESS")]
    nats: Option<String>,
    /// json5 configuration file; flags given explicitly take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let args = SnifferArgs::parse();
    let config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(args.port, args.nats);

    let sniffer = Arc::new(Sniffer::start(config.sniffer.clone(), &NatsConnector::new()).await?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(
        port = config.port,
        server_address = config.sniffer.bus.server_address.as_str(),
        "Service is running, press CTRL+C to quit"
    );

    axum::serve(listener, broker::router(sniffer.clone()))
        .with_graceful_shutdown(shutdown_signal(sniffer.clone()))
        .await?;

    sniffer.quit().await;
    info!("Sniffer terminated");
    Ok(())
}

/// Resolves on Ctrl-C after quitting the sniffer, which ends every open SSE stream.
async fn shutdown_signal(sniffer: Arc<Sniffer>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(err = %err, "unable to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    sniffer.quit().await;
}
