pub mod cep;
pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod resolver;
pub mod service;
pub mod upstream;

#[cfg(test)]
mod testutils;

use crate::errors::CepRouterError;
use crate::handler::CepHandler;
use crate::resolver::Resolver;
use crate::service::CepRouterService;
use crate::upstream::{BrasilApiClient, ViaCepClient};
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

pub use crate::cep::{AddressRecord, Cep, FetchOutcome, ProviderResult};
pub use crate::errors::{ResolveError, UpstreamError};

/// Builds the resolver from config, each upstream client owning a handle to
/// the same connection pool.
pub fn build_resolver(config: &config::Config) -> Result<Resolver, CepRouterError> {
    let client = reqwest::Client::builder().build()?;

    let brasilapi = BrasilApiClient::new(client.clone(), config.upstreams.brasilapi.clone());
    let viacep = ViaCepClient::new(client, config.upstreams.viacep.clone());

    Ok(Resolver::new(Arc::new(brasilapi), Arc::new(viacep)))
}

pub async fn run(config: config::Config) -> Result<(), CepRouterError> {
    config.validate()?;

    let resolver = build_resolver(&config)?;
    let handler = CepHandler::new(resolver, config.timeout);
    let service = CepRouterService::new(handler);

    tracing::info!(
        brasilapi = %config.upstreams.brasilapi,
        viacep = %config.upstreams.viacep,
        timeout = ?config.timeout,
        "Starting cep-router"
    );

    let router_task = run_http_service(&config.listener.host, config.listener.port, service);

    match &config.admin_listener {
        Some(admin_listener) => {
            let admin_service = AdminService::<_, CepRouterError>::new(|| true);
            let admin_task =
                run_http_service(&admin_listener.host, admin_listener.port, admin_service);
            tokio::try_join!(router_task, admin_task)?;
        }
        None => router_task.await?,
    }

    Ok(())
}
