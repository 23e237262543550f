//! Party document API
//!
//! Every handler acts through a [`SyncAdapter`] bound to the caller's
//! session identity. Reads create the party from the template default when
//! it does not exist yet; writes replace the stored document in full.

use actix_web::{web, HttpRequest, HttpResponse};
use checklist_core::{ChecklistDocument, ToggleTarget};
use party_sync::{share_url, PartyKey};

use crate::dto::{NewPartyDTO, PartySnapshotDTO, SessionDTO, ToggleResponseDTO};
use crate::error::Result;
use crate::identity::SessionIdentity;
use crate::middleware::extract_request_id;
use crate::server::AppState;

async fn establish_session(identity: SessionIdentity) -> HttpResponse {
    let identity = identity.into_inner();
    tracing::info!(session_id = %identity.session_id, "Session established");
    HttpResponse::Ok().json(SessionDTO {
        session_id: identity.token(),
    })
}

async fn create_party(
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
) -> Result<HttpResponse> {
    let adapter = app_state.adapter(identity.into_inner());
    let key = adapter.new_key();
    adapter
        .ensure_document(&key, &app_state.default_document())
        .await?;

    let url = share_url(&app_state.public_url, &key);
    tracing::info!(party_id = %key, share_url = %url, "New party created");

    Ok(HttpResponse::Created().json(NewPartyDTO {
        party_id: key.to_string(),
        share_url: url.to_string(),
    }))
}

async fn get_party(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
) -> Result<HttpResponse> {
    let key = PartyKey::new(path.into_inner())?;
    let document = app_state
        .adapter(identity.into_inner())
        .ensure_document(&key, &app_state.default_document())
        .await?;

    Ok(HttpResponse::Ok().json(PartySnapshotDTO::new(&key, document)))
}

async fn replace_party(
    path: web::Path<String>,
    body: web::Json<ChecklistDocument>,
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
    http_req: HttpRequest,
) -> Result<HttpResponse> {
    let key = PartyKey::new(path.into_inner())?;
    let document = body.into_inner();
    document.validate()?;

    app_state
        .adapter(identity.into_inner())
        .publish(&key, &document)
        .await?;

    tracing::info!(
        request_id = ?extract_request_id(&http_req),
        party_id = %key,
        "Party document replaced"
    );

    Ok(HttpResponse::Ok().json(PartySnapshotDTO::new(&key, document)))
}

async fn toggle_node(
    path: web::Path<String>,
    body: web::Json<ToggleTarget>,
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
    http_req: HttpRequest,
) -> Result<HttpResponse> {
    let key = PartyKey::new(path.into_inner())?;
    let target = body.into_inner();
    let adapter = app_state.adapter(identity.into_inner());

    let mut document = adapter
        .ensure_document(&key, &app_state.default_document())
        .await?;
    let changed = document.toggle(&target);

    if changed {
        adapter.publish(&key, &document).await?;
    } else {
        tracing::debug!(
            request_id = ?extract_request_id(&http_req),
            party_id = %key,
            section_id = %target.section_id,
            task_id = %target.task_id,
            subtask_id = ?target.subtask_id,
            "Toggle target matched no node"
        );
    }

    Ok(HttpResponse::Ok().json(ToggleResponseDTO {
        snapshot: PartySnapshotDTO::new(&key, document),
        changed,
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/session").route(web::post().to(establish_session)))
        .service(web::resource("/parties").route(web::post().to(create_party)))
        .service(
            web::resource("/parties/{party_id}")
                .route(web::get().to(get_party))
                .route(web::put().to(replace_party)),
        )
        .service(web::resource("/parties/{party_id}/toggle").route(web::post().to(toggle_node)));
}
