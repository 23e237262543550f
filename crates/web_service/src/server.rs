use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use checklist_core::{ChecklistDocument, ChecklistTemplate};
use party_sync::{DocumentStore, Identity, PartyKey, SyncAdapter};
use url::Url;

use crate::config::ServiceConfig;
use crate::controllers::{events_controller, page_controller, party_controller, system_controller};
use crate::error::{AppError, Result};
use crate::middleware::RequestTracing;

/// Shared state handed to every handler
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub template: ChecklistTemplate,
    pub default_party: PartyKey,
    pub public_url: Url,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        template: ChecklistTemplate,
        default_party: PartyKey,
        public_url: Url,
    ) -> Self {
        Self {
            store,
            template,
            default_party,
            public_url,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(
            config.build_store(),
            config.load_template()?,
            config.default_party_key()?,
            config.public_base_url()?,
        ))
    }

    /// Sync adapter acting on behalf of `identity`
    pub fn adapter(&self, identity: Identity) -> SyncAdapter {
        SyncAdapter::new(Arc::clone(&self.store), identity)
    }

    /// The document a party starts with
    pub fn default_document(&self) -> ChecklistDocument {
        self.template.document()
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(page_controller::config)
        .configure(system_controller::config)
        .service(
            web::scope("/v1")
                .configure(party_controller::config)
                .configure(events_controller::config),
        );
}

pub async fn run(config: ServiceConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;

    tracing::info!(
        storage = ?config.storage,
        data_dir = %config.data_dir.display(),
        default_party = %state.default_party,
        sections = state.template.sections.len(),
        "Starting checklist service"
    );

    let app_state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(RequestTracing)
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind((config.bind.as_str(), config.port))
    .map_err(|e| {
        AppError::Config(format!(
            "failed to bind {}:{}: {e}",
            config.bind, config.port
        ))
    })?
    .run();

    tracing::info!(
        "Checklist service listening on http://{}:{}",
        config.bind,
        config.port
    );

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Web server error");
        return Err(AppError::IoError(e));
    }

    Ok(())
}
