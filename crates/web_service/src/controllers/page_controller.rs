use actix_web::{web, HttpResponse};
use party_sync::{resolve_key, share_url};
use serde::Deserialize;

use crate::identity::SessionIdentity;
use crate::render::{render_page, PageView};
use crate::server::AppState;

/// `?party=<key>`
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub party: Option<String>,
}

/// Render the checklist for the party named in the address.
///
/// A missing or invalid key falls back to the default party. If the store
/// cannot be reached the template default is rendered as a local copy.
async fn checklist_page(
    query: web::Query<PageQuery>,
    app_state: web::Data<AppState>,
    identity: SessionIdentity,
) -> HttpResponse {
    let key = resolve_key(query.party.as_deref(), &app_state.default_party);
    let default = app_state.default_document();

    let (document, synced) = match app_state
        .adapter(identity.into_inner())
        .ensure_document(&key, &default)
        .await
    {
        Ok(document) => (document, true),
        Err(e) => {
            tracing::warn!(
                party_id = %key,
                error = %e,
                "Store unavailable, rendering local copy"
            );
            (default, false)
        }
    };

    let url = share_url(&app_state.public_url, &key);
    let html = render_page(&PageView {
        title: &app_state.template.title,
        footer: app_state.template.footer.as_deref(),
        key: &key,
        document: &document,
        share_url: &url,
        synced,
    });

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(checklist_page)));
}
