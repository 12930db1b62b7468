//! Horizons query construction.
//!
//! The Horizons API takes its target designation through a `COMMAND`
//! parameter that accepts several syntaxes (`DES=C/2025 N1`,
//! `DES=3I/ATLAS`, or a plain designation). Normalization here is
//! deliberately minimal: trim, reject empty, and pass the designation
//! through otherwise — Horizons itself is the authority on what the
//! string means. A leading `COMMAND=` prefix is stripped when building
//! parameters, since the value is sent under that key anyway.

use url::Url;

use crate::error::{IngestError, IngestResult};

/// Default coordinate center (solar system barycenter).
pub const DEFAULT_CENTER: &str = "500@0";
/// Default ephemeris type (state vectors).
pub const DEFAULT_EPHEM_TYPE: &str = "V";
/// The response container requested from the API.
pub const RESPONSE_FORMAT: &str = "json";

/// One fully-specified Horizons query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonsQuery {
    command: String,
    center: String,
    ephem_type: String,
}

impl HorizonsQuery {
    /// Builds a query for a target designation with default center and
    /// ephemeris type.
    pub fn new(command: &str) -> IngestResult<Self> {
        Ok(Self {
            command: normalize_command(command)?,
            center: DEFAULT_CENTER.to_string(),
            ephem_type: DEFAULT_EPHEM_TYPE.to_string(),
        })
    }

    /// Overrides the coordinate center.
    pub fn with_center(mut self, center: &str) -> Self {
        self.center = center.to_string();
        self
    }

    /// Overrides the ephemeris type.
    pub fn with_ephem_type(mut self, ephem_type: &str) -> Self {
        self.ephem_type = ephem_type.to_string();
        self
    }

    /// The normalized `COMMAND` designation this query will send.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Query parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let command = match self.command.split_once('=') {
            Some((key, rest)) if key.eq_ignore_ascii_case("COMMAND") => rest.trim().to_string(),
            _ => self.command.clone(),
        };
        vec![
            ("format", RESPONSE_FORMAT.to_string()),
            ("COMMAND", command),
            ("EPHEM_TYPE", self.ephem_type.clone()),
            ("CENTER", self.center.clone()),
        ]
    }

    /// The full request URL against an endpoint base.
    pub fn request_url(&self, base: &str) -> IngestResult<Url> {
        Url::parse_with_params(base, self.params()).map_err(|source| IngestError::Url {
            base: base.to_string(),
            source,
        })
    }
}

/// Normalizes a user-supplied Horizons command string.
///
/// `DES=...` and `COMMAND=...` prefixes are preserved here; plain
/// designations pass through unchanged. Only an empty command is
/// rejected.
pub fn normalize_command(command: &str) -> IngestResult<String> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err(IngestError::config("empty Horizons command"));
    }
    Ok(trimmed.to_string())
}
