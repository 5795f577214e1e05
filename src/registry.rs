use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use crate::constants::USER_AGENT;
use crate::error::FetchError;
use crate::npi::Npi;

#[derive(Debug, Deserialize)]
struct RegistryEnvelope {
    #[serde(default)]
    results: Vec<RawProviderRecord>,
    #[serde(rename = "Errors", default)]
    errors: Vec<RegistryErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct RegistryErrorEntry {
    description: Option<String>,
}

/// One entry of the registry's `results` array, as published by NPPES.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProviderRecord {
    pub enumeration_type: Option<String>,
    #[serde(default)]
    pub basic: RawBasic,
    #[serde(default)]
    pub taxonomies: Vec<RawTaxonomy>,
    #[serde(default)]
    pub addresses: Vec<RawAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawBasic {
    pub name_prefix: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<String>,
    /// Pre-2023 payloads carry the sex code under this name.
    pub gender: Option<String>,
    pub last_updated: Option<String>,
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTaxonomy {
    pub desc: Option<String>,
    pub primary: Option<bool>,
    pub license: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAddress {
    pub address_purpose: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub telephone_number: Option<String>,
    pub fax_number: Option<String>,
}

/// Source of raw provider records, keyed by NPI.
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    async fn fetch(&self, npi: &Npi) -> Result<RawProviderRecord, FetchError>;
}

/// NPPES registry client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: String,
    api_version: String,
}

impl HttpRegistry {
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed creating HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_version: api_version.into(),
        })
    }
}

#[async_trait]
impl ProviderRegistry for HttpRegistry {
    async fn fetch(&self, npi: &Npi) -> Result<RawProviderRecord, FetchError> {
        let npi = npi.as_str();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("number", npi), ("version", self.api_version.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::upstream(npi, format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::upstream(npi, format!("reading body failed: {e}")))?;
        if !status.is_success() {
            return Err(FetchError::upstream(
                npi,
                format!("status {status}. Body: {}", truncate_for_log(&body)),
            ));
        }

        parse_registry_body(npi, &body)
    }
}

/// Decodes a registry response body and picks the first matching record.
pub fn parse_registry_body(npi: &str, body: &str) -> Result<RawProviderRecord, FetchError> {
    let envelope: RegistryEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::upstream(npi, format!("invalid registry JSON: {e}")))?;

    if !envelope.errors.is_empty() {
        let reasons = envelope
            .errors
            .iter()
            .filter_map(|e| e.description.as_deref())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FetchError::upstream(npi, format!("registry errors: {reasons}")));
    }

    envelope
        .results
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NotFound(npi.to_string()))
}

fn truncate_for_log(text: &str) -> String {
    let trimmed = text.trim();
    let max_len = 300usize;
    match trimmed.char_indices().nth(max_len) {
        None => trimmed.to_string(),
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
    }
}
