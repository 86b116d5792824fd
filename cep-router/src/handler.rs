use crate::cep::{Cep, ProviderResult};
use crate::errors::{CepRouterError, ResolveError};
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use crate::resolver::Resolver;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use shared::http::{make_error_response, make_json_response, make_text_response};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

pub type HandlerBody = BoxBody<Bytes, CepRouterError>;

pub const BOTH_FAILED_MESSAGE: &str = "Erro ao obter CEP de todas as APIs";
pub const TIMEOUT_MESSAGE: &str = "Tempo de espera esgotado para obter o CEP";

/// Turns a raw postal code into an HTTP response.
///
/// Owns validation and the per-request deadline, and is the only place where
/// resolution errors become status codes and messages.
pub struct CepHandler {
    resolver: Resolver,
    timeout: Duration,
    inflight: AtomicUsize,
}

impl CepHandler {
    pub fn new(resolver: Resolver, timeout: Duration) -> Self {
        Self {
            resolver,
            timeout,
            inflight: AtomicUsize::new(0),
        }
    }

    /// Requests currently being handled, including ones whose caller has not
    /// yet dropped the future.
    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    pub async fn get_cep(&self, raw_cep: &str) -> Response<HandlerBody> {
        let mut guard = InflightGuard::enter(&self.inflight);

        let response = self.lookup(raw_cep).await;

        guard.status = Some(response.status());
        response
    }

    async fn lookup(&self, raw_cep: &str) -> Response<HandlerBody> {
        let cep = match Cep::parse(raw_cep) {
            Ok(cep) => cep,
            Err(e) => {
                tracing::debug!(cep = raw_cep, "Rejected: {e}");
                return make_text_response(StatusCode::BAD_REQUEST, &e.to_string());
            }
        };

        let deadline = Instant::now() + self.timeout;

        match self.resolver.resolve(&cep, deadline).await {
            Ok(result) => success_response(result),
            Err(ResolveError::BothFailed { failures }) => {
                for failure in &failures {
                    tracing::warn!(provider = failure.provider, %cep, "{}", failure.error);
                }
                make_text_response(StatusCode::INTERNAL_SERVER_ERROR, BOTH_FAILED_MESSAGE)
            }
            Err(ResolveError::Timeout { failed }) => {
                tracing::warn!(%cep, failed, timeout = ?self.timeout, "Lookup timed out");
                make_text_response(StatusCode::GATEWAY_TIMEOUT, TIMEOUT_MESSAGE)
            }
        }
    }
}

/// Tracks one request in the in-flight gauge and the duration histogram.
///
/// Both are recorded on drop so a request abandoned mid-lookup (client gone,
/// connection closed) still leaves the gauge and is reported as `cancelled`.
struct InflightGuard<'a> {
    inflight: &'a AtomicUsize,
    started: Instant,
    status: Option<StatusCode>,
}

impl<'a> InflightGuard<'a> {
    fn enter(inflight: &'a AtomicUsize) -> Self {
        let current = inflight.fetch_add(1, Ordering::SeqCst) + 1;
        shared::gauge!(REQUESTS_INFLIGHT).set(current as f64);

        Self {
            inflight,
            started: Instant::now(),
            status: None,
        }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let current = self.inflight.fetch_sub(1, Ordering::SeqCst) - 1;
        shared::gauge!(REQUESTS_INFLIGHT).set(current as f64);

        let status = match self.status {
            Some(status) => status.as_str().to_owned(),
            None => "cancelled".to_owned(),
        };
        shared::histogram!(REQUEST_DURATION, "status" => status)
            .record(self.started.elapsed().as_secs_f64());
    }
}

fn success_response(result: ProviderResult) -> Response<HandlerBody> {
    let ProviderResult { provider, record } = result;
    tracing::info!(provider, cep = ?record.cep, "CEP resolved");
    tracing::debug!(provider, ?record, "Resolved record");

    match serde_json::to_vec(&record) {
        Ok(body) => make_json_response(body),
        Err(e) => {
            tracing::error!("Failed to serialize address record: {e}");
            make_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
