//! Live document feed
//!
//! `GET /v1/parties/{party_id}/events` streams a `document` event with the
//! current snapshot, then one per write to the party, plus a `signal`
//! heartbeat every 30 seconds.

use std::time::Duration;

use actix_web::{web, HttpRequest};
use actix_web_lab::{sse, util::InfallibleStream};
use checklist_core::ChecklistDocument;
use party_sync::PartyKey;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::dto::PartySnapshotDTO;
use crate::error::Result;
use crate::identity::SessionIdentity;
use crate::middleware::extract_request_id;
use crate::server::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const KEEP_ALIVE: Duration = Duration::from_secs(15);

pub const DOCUMENT_EVENT: &str = "document";
pub const SIGNAL_EVENT: &str = "signal";

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalEvent {
    Heartbeat { timestamp: String },
}

fn document_event(key: &PartyKey, document: ChecklistDocument) -> Option<sse::Event> {
    match sse::Data::new_json(PartySnapshotDTO::new(key, document)) {
        Ok(data) => Some(sse::Event::Data(data.event(DOCUMENT_EVENT))),
        Err(e) => {
            tracing::error!(party_id = %key, error = %e, "Failed to encode document event");
            None
        }
    }
}

async fn subscribe_party_events(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
    http_req: HttpRequest,
) -> Result<sse::Sse<InfallibleStream<ReceiverStream<sse::Event>>>> {
    let key = PartyKey::new(path.into_inner())?;
    let request_id = extract_request_id(&http_req);
    let adapter = app_state.adapter(identity.into_inner());

    adapter
        .ensure_document(&key, &app_state.default_document())
        .await?;
    let (current, mut changes) = adapter.watch(&key).await?;

    tracing::info!(
        request_id = ?request_id,
        party_id = %key,
        session_id = %adapter.identity().session_id,
        "SSE subscription opened"
    );

    let (tx, rx) = mpsc::channel::<sse::Event>(32);

    tokio::spawn(async move {
        if let Some(event) = current.and_then(|doc| document_event(&key, doc)) {
            if tx.send(event).await.is_err() {
                return;
            }
        }

        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
            HEARTBEAT_INTERVAL,
        );

        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(document) = change else {
                        break;
                    };
                    let Some(event) = document_event(&key, document) else {
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        tracing::debug!(party_id = %key, "SSE client disconnected");
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    let signal = SignalEvent::Heartbeat {
                        timestamp: chrono::Utc::now().to_rfc3339(),
                    };
                    if let Ok(data) = sse::Data::new_json(&signal) {
                        if tx.send(sse::Event::Data(data.event(SIGNAL_EVENT))).await.is_err() {
                            tracing::debug!(party_id = %key, "SSE client disconnected (heartbeat)");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!(party_id = %key, "SSE event stream closed");
    });

    Ok(sse::Sse::from_infallible_receiver(rx).with_keep_alive(KEEP_ALIVE))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/parties/{party_id}/events").route(web::get().to(subscribe_party_events)),
    );
}
