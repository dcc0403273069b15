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


//! HTTP surface of the sniffer: an SSE stream per sniffing client plus a small index page.

use async_stream::stream;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use subject_sniffer::{HandlerId, MessageHandler, Sniffer};
use tokio::sync::mpsc;
use tracing::{info, warn};

const COMPONENT: &str = "sse_broker";
const EVENT_CLIENT_CONNECTED: &str = "sse_client_connected";
const EVENT_CLIENT_GONE: &str = "sse_client_gone";
const EVENT_SNIFF_FAILED: &str = "sse_sniff_failed";
const INDEX_PAGE: &str = include_str!("../templates/index.html");

/// One frame of a client's sniff stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SniffFrame {
    Data(String),
    Error(String),
}

impl SniffFrame {
    fn into_event(self) -> Event {
        match self {
            // SSE framing cannot carry carriage returns.
            SniffFrame::Data(payload) => Event::default().data(payload.replace('\r', "")),
            SniffFrame::Error(diagnostic) => Event::default()
                .event("error")
                .data(diagnostic.replace('\r', "")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SniffParams {
    #[serde(default)]
    subject: String,
}

pub(crate) fn router(sniffer: Arc<Sniffer>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/sniff", get(sniff))
        .route("/sniff/", get(sniff))
        .route("/subjects", get(subjects))
        .fallback(not_found)
        .with_state(sniffer)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

async fn subjects(State(sniffer): State<Arc<Sniffer>>) -> Json<HashMap<String, usize>> {
    Json(sniffer.handler_counts())
}

async fn sniff(
    State(sniffer): State<Arc<Sniffer>>,
    Query(params): Query<SniffParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        event = EVENT_CLIENT_CONNECTED,
        component = COMPONENT,
        subject = params.subject.as_str(),
        "incoming client"
    );

    let events = sniff_frames(sniffer, params.subject).map(|frame| Ok(frame.into_event()));
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Unsniffs the client's handler once its stream is dropped.
struct SniffGuard {
    sniffer: Arc<Sniffer>,
    subject: String,
    handler_id: HandlerId,
}

impl Drop for SniffGuard {
    fn drop(&mut self) {
        self.sniffer.unsniff(&self.subject, &self.handler_id);
        info!(
            event = EVENT_CLIENT_GONE,
            component = COMPONENT,
            subject = self.subject.as_str(),
            handler_id = self.handler_id.as_str(),
            "client gone"
        );
    }
}

/// Sniffs `subject` on first poll and yields every payload until the client goes away
/// or the sniffer quits. A failed sniff yields one error frame and ends the stream.
pub(crate) fn sniff_frames(
    sniffer: Arc<Sniffer>,
    subject: String,
) -> impl Stream<Item = SniffFrame> + Send {
    stream! {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let handler: MessageHandler = Arc::new(move |payload: &str| {
            let _ = tx.send(payload.to_string());
        });

        match sniffer.sniff(&subject, handler).await {
            Ok(handler_id) => {
                let _guard = SniffGuard {
                    sniffer: sniffer.clone(),
                    subject: subject.clone(),
                    handler_id,
                };
                while let Some(payload) = rx.recv().await {
                    yield SniffFrame::Data(payload);
                }
            }
            Err(err) => {
                warn!(
                    event = EVENT_SNIFF_FAILED,
                    component = COMPONENT,
                    subject = subject.as_str(),
                    err = %err,
                    "unable to sniff subject for client"
                );
                yield SniffFrame::Error(format!(
                    "There was an error while sniffing subject [{subject}]: {err}"
                ));
            }
        }
    }
}
