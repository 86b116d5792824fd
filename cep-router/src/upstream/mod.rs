//! Clients for the postal code lookup providers.
//!
//! Every provider is reached the same way: substitute the postal code into a
//! URL template, issue one GET, expect a 200 with a JSON body, and map the
//! provider's field names onto [`AddressRecord`]. A [`Provider`] only supplies
//! the name, the response schema and the field mapping; [`HttpUpstream`]
//! does the rest.

mod brasilapi;
mod viacep;

pub use brasilapi::BrasilApi;
pub use viacep::ViaCep;

use crate::cep::{AddressRecord, Cep};
use crate::config::UrlTemplate;
use crate::errors::UpstreamError;
use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tokio::time::{Instant, timeout_at};

pub type BrasilApiClient = HttpUpstream<BrasilApi>;
pub type ViaCepClient = HttpUpstream<ViaCep>;

/// A single postal code lookup against one provider.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Provider name reported alongside successful results
    fn name(&self) -> &'static str;

    /// Looks up `cep`, giving up once `deadline` passes.
    ///
    /// The deadline bounds the wait on this call's own I/O. It is a
    /// best-effort signal: the caller may also abandon the call earlier.
    async fn lookup(&self, cep: &Cep, deadline: Instant) -> Result<AddressRecord, UpstreamError>;
}

/// Schema and field mapping of one provider
pub trait Provider: Send + Sync + 'static {
    const NAME: &'static str;

    type Response: DeserializeOwned + Send;

    fn into_record(response: Self::Response) -> Result<AddressRecord, UpstreamError>;
}

/// HTTP client for a [`Provider`], owning its transport and URL template.
pub struct HttpUpstream<P> {
    client: reqwest::Client,
    template: UrlTemplate,
    _provider: PhantomData<fn() -> P>,
}

impl<P: Provider> HttpUpstream<P> {
    pub fn new(client: reqwest::Client, template: UrlTemplate) -> Self {
        Self {
            client,
            template,
            _provider: PhantomData,
        }
    }

    async fn fetch(&self, url: &str) -> Result<AddressRecord, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let parsed: P::Response =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        P::into_record(parsed)
    }
}

#[async_trait]
impl<P: Provider> UpstreamClient for HttpUpstream<P> {
    fn name(&self) -> &'static str {
        P::NAME
    }

    async fn lookup(&self, cep: &Cep, deadline: Instant) -> Result<AddressRecord, UpstreamError> {
        let url = self.template.render(cep);

        let result = timeout_at(deadline, self.fetch(&url))
            .await
            .unwrap_or_else(|_| Err(UpstreamError::Transport("deadline exceeded".into())));

        match &result {
            Ok(_) => tracing::debug!(provider = P::NAME, %cep, "Upstream lookup succeeded"),
            Err(e) => tracing::warn!(provider = P::NAME, %cep, "Upstream lookup failed: {e}"),
        }

        result
    }
}

/// Providers send empty strings for unknown fields; those stay absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
