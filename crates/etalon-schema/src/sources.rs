//! The authoritative source registry.
//!
//! `config/sources.json` declares every source the project ingests
//! from: its authority rank and the endpoints it exposes. Ingest
//! resolves endpoint URLs through this registry before fetching, and
//! record validation checks that a record's source and endpoint
//! identifiers actually exist here.
//!
//! Decoding is deliberately lenient. Entries that are not objects, or
//! that lack an identifier, can never satisfy a lookup, so they are
//! dropped instead of failing the load. Strictness about the registry
//! lives at the point of use (ingest refuses an endpoint without a
//! usable URL; validation refuses a record naming an unknown source).

use std::path::Path;

use serde_json::Value;

use etalon_core::{EndpointId, SourceId};

use crate::document::read_json;
use crate::error::SchemaResult;

/// One retrievable endpoint declared under a source.
#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    pub endpoint_id: EndpointId,
    /// Request URL. Empty when the registry entry does not carry one;
    /// callers that fetch must check before use.
    pub url: String,
    /// HTTP method, upper-cased. `GET` when the registry does not say.
    pub method: String,
}

/// One source declared in the registry.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub source_id: SourceId,
    /// Trust position of this source; lower is more authoritative.
    /// Absent or non-integer ranks decode as `None`.
    pub authority_rank: Option<i64>,
    /// Kind of service, e.g. `ephemeris_service`. Empty when undeclared.
    pub source_type: String,
    /// License of the data this source serves. Empty when undeclared.
    pub license: String,
    /// Citation line copied into records built from this source.
    pub citation: String,
    pub endpoints: Vec<SourceEndpoint>,
}

impl SourceEntry {
    /// Looks up an endpoint by identifier.
    pub fn find_endpoint(&self, endpoint_id: &str) -> Option<&SourceEndpoint> {
        self.endpoints
            .iter()
            .find(|ep| ep.endpoint_id.as_str() == endpoint_id)
    }

    /// All declared endpoint identifiers, in registry order.
    pub fn endpoint_ids(&self) -> Vec<&str> {
        self.endpoints
            .iter()
            .map(|ep| ep.endpoint_id.as_str())
            .collect()
    }
}

/// The parsed source registry.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceEntry>,
}

impl SourceRegistry {
    /// Decodes a registry from an already-parsed document.
    ///
    /// A document without a `sources` list yields an empty registry.
    pub fn from_value(doc: &Value) -> Self {
        let mut sources = Vec::new();
        if let Some(entries) = doc.get("sources").and_then(Value::as_array) {
            for entry in entries {
                if let Some(source) = decode_source(entry) {
                    sources.push(source);
                }
            }
        }
        Self { sources }
    }

    /// Loads a registry from a JSON file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let doc = read_json(path)?;
        let registry = Self::from_value(&doc);
        tracing::debug!(
            path = %path.display(),
            sources = registry.len(),
            "loaded source registry"
        );
        Ok(registry)
    }

    /// Looks up a source by identifier.
    pub fn find_source(&self, source_id: &str) -> Option<&SourceEntry> {
        self.sources
            .iter()
            .find(|s| s.source_id.as_str() == source_id)
    }

    /// All declared sources, in registry order.
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn decode_source(entry: &Value) -> Option<SourceEntry> {
    let map = entry.as_object()?;
    let source_id = map.get("source_id").and_then(Value::as_str)?;
    let authority_rank = map.get("authority_rank").and_then(Value::as_i64);

    let mut endpoints = Vec::new();
    if let Some(list) = map.get("endpoints").and_then(Value::as_array) {
        for ep in list {
            if let Some(endpoint) = decode_endpoint(ep) {
                endpoints.push(endpoint);
            }
        }
    }

    Some(SourceEntry {
        source_id: SourceId::new(source_id),
        authority_rank,
        source_type: string_field(map, "source_type"),
        license: string_field(map, "license"),
        citation: string_field(map, "citation"),
        endpoints,
    })
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn decode_endpoint(entry: &Value) -> Option<SourceEndpoint> {
    let map = entry.as_object()?;
    let endpoint_id = map.get("endpoint_id").and_then(Value::as_str)?;
    let url = map
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let method = map
        .get("retrieval")
        .and_then(|r| r.get("method"))
        .and_then(Value::as_str)
        .map(|m| m.trim().to_ascii_uppercase())
        .unwrap_or_else(|| "GET".to_string());

    Some(SourceEndpoint {
        endpoint_id: EndpointId::new(endpoint_id),
        url,
        method,
    })
}
