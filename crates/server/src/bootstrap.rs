use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use cardline_agent::analysis::AnalysisService;
use cardline_agent::llm::{self, CompletionClient, CompletionError};
use cardline_agent::{AgentSettings, VirtualAgent};
use cardline_core::config::{AppConfig, ConfigError, LoadOptions};
use cardline_core::{Catalog, CatalogError, SharedAccount};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::{api, health, virtual_agent};

/// Shared handler state; clones are cheap handles onto the same account and clients.
#[derive(Clone)]
pub struct AppState {
    pub agent: VirtualAgent,
    pub analysis: AnalysisService,
}

impl AppState {
    pub fn new(config: &AppConfig, catalog: Arc<Catalog>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            agent: VirtualAgent::new(
                SharedAccount::default(),
                completion.clone(),
                AgentSettings::from(config),
            ),
            analysis: AnalysisService::new(catalog, completion, config.llm.analysis_model.clone()),
        }
    }
}

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("sample data catalog failed to load: {0}")]
    Catalog(#[from] CatalogError),
    #[error("completion client could not be built: {0}")]
    Completion(#[from] CompletionError),
    #[error("invalid CORS origin `{0}`")]
    CorsOrigin(String),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    bootstrap_with_config(AppConfig::load(options)?)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Arc::new(Catalog::load_embedded()?);
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        scenarios = catalog.fraud_scenarios().len(),
        "sample data catalog loaded"
    );

    let completion = llm::from_config(&config.llm)?;
    if completion.is_configured() {
        info!(
            event_name = "system.bootstrap.completion_ready",
            correlation_id = "bootstrap",
            provider = ?config.llm.provider,
            base_url = %config.llm.effective_base_url(),
            "completion client configured"
        );
    } else {
        warn!(
            event_name = "system.bootstrap.completion_unconfigured",
            correlation_id = "bootstrap",
            "no completion credential configured; AI endpoints will fail until one is set"
        );
    }

    let state = AppState::new(&config, catalog, completion);
    let router = router(state, cors_layer(&config.server.cors_allowed_origins)?);
    Ok(Application { config, router })
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(health::router::<AppState>())
        .merge(api::router())
        .merge(virtual_agent::router())
        .fallback(api::not_found)
        .with_state(state)
        .layer(cors)
}

/// Credentialed CORS cannot use wildcards, so methods and headers mirror the preflight.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, BootstrapError> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| BootstrapError::CorsOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::Router;
    use cardline_agent::llm::CompletionClient;
    use cardline_core::config::AppConfig;
    use cardline_core::Catalog;

    use super::{cors_layer, router, AppState};

    pub fn state_with(completion: Arc<dyn CompletionClient>) -> AppState {
        let catalog = Arc::new(Catalog::load_embedded().expect("fixtures"));
        AppState::new(&AppConfig::default(), catalog, completion)
    }

    pub fn app_with(completion: Arc<dyn CompletionClient>) -> Router {
        let origins = AppConfig::default().server.cors_allowed_origins;
        router(state_with(completion), cors_layer(&origins).expect("default origins are valid"))
    }
}
