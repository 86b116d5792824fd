use super::{Provider, non_empty};
use crate::cep::AddressRecord;
use crate::errors::UpstreamError;
use serde::Deserialize;

/// BrasilAPI `/api/cep/v1/{cep}`
pub struct BrasilApi;

#[derive(Debug, Deserialize)]
pub struct BrasilApiResponse {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    service: Option<String>,
}

impl Provider for BrasilApi {
    const NAME: &'static str = "BrasilAPI";

    type Response = BrasilApiResponse;

    fn into_record(response: BrasilApiResponse) -> Result<AddressRecord, UpstreamError> {
        Ok(AddressRecord {
            cep: non_empty(response.cep),
            estado: non_empty(response.state),
            cidade: non_empty(response.city),
            bairro: non_empty(response.neighborhood),
            rua: non_empty(response.street),
            servico: non_empty(response.service),
            ..Default::default()
        })
    }
}
