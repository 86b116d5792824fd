//! Postal code and address types shared by the upstream clients, the resolver
//! and the request handler.

use crate::errors::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CEP_LENGTH: usize = 8;

/// Input rejected before any upstream is queried.
///
/// The messages are returned verbatim to API clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CepValidationError {
    #[error("CEP é obrigatório")]
    Empty,

    #[error("CEP deve conter exatamente 8 dígitos numéricos")]
    InvalidFormat,
}

/// A Brazilian postal code: exactly 8 ASCII digits, never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cep(String);

impl Cep {
    pub fn parse(raw: &str) -> Result<Self, CepValidationError> {
        if raw.is_empty() {
            return Err(CepValidationError::Empty);
        }

        if raw.len() != CEP_LENGTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CepValidationError::InvalidFormat);
        }

        Ok(Cep(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cep {
    type Err = CepValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cep::parse(s)
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address data for a postal code, in the wire shape returned to clients.
///
/// Each provider keeps its own vocabulary: BrasilAPI answers fill `rua`,
/// `cidade` and `estado`, ViaCEP answers fill `logradouro`, `localidade` and
/// `uf` (with `estado` repeating `uf`). Absent fields are omitted from the
/// JSON representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rua: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regiao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siafi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servico: Option<String>,
}

/// A record together with the name of the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResult {
    pub provider: &'static str,
    pub record: AddressRecord,
}

pub type FetchOutcome = Result<ProviderResult, ResolveError>;
