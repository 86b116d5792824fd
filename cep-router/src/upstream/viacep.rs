use super::{Provider, non_empty};
use crate::cep::AddressRecord;
use crate::errors::UpstreamError;
use serde::Deserialize;

/// ViaCEP `/ws/{cep}/json/`
pub struct ViaCep;

#[derive(Debug, Deserialize)]
pub struct ViaCepResponse {
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    complemento: Option<String>,
    #[serde(default)]
    unidade: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    regiao: Option<String>,
    #[serde(default)]
    ibge: Option<String>,
    #[serde(default)]
    gia: Option<String>,
    #[serde(default)]
    ddd: Option<String>,
    #[serde(default)]
    siafi: Option<String>,
    /// Set on an otherwise successful response when the CEP does not exist.
    /// Sent either as a boolean or as the string "true".
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }
}

impl Provider for ViaCep {
    const NAME: &'static str = "ViaCEP";

    type Response = ViaCepResponse;

    fn into_record(response: ViaCepResponse) -> Result<AddressRecord, UpstreamError> {
        if response.is_not_found() {
            return Err(UpstreamError::Status(http::StatusCode::NOT_FOUND.as_u16()));
        }

        Ok(AddressRecord {
            cep: non_empty(response.cep),
            logradouro: non_empty(response.logradouro),
            complemento: non_empty(response.complemento),
            unidade: non_empty(response.unidade),
            bairro: non_empty(response.bairro),
            localidade: non_empty(response.localidade),
            estado: non_empty(response.uf.clone()),
            uf: non_empty(response.uf),
            regiao: non_empty(response.regiao),
            ibge: non_empty(response.ibge),
            gia: non_empty(response.gia),
            ddd: non_empty(response.ddd),
            siafi: non_empty(response.siafi),
            ..Default::default()
        })
    }
}
