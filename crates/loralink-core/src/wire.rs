//! JSON wire contract between the engine and the device REST API.
//!
//! The engine never performs HTTP itself; the console does the transport
//! and hands the raw JSON here. Three endpoints are consumed:
//!
//! | Path | Payload |
//! |------|---------|
//! | `GET/POST /lora/settings` | [`SettingsDocument`] |
//! | `GET /lora/bands` | bare array of profiles, or an envelope object |
//! | `GET /lora/regulatory` | `{ regions, compliance }` |
//!
//! Parsing validates on ingestion and fails fast on malformed data
//! instead of propagating half-populated records.

use crate::error::Result;
use crate::params::RadioParameters;
use crate::tables::{HardwareBandProfile, ReferenceTables, Region, RegulatoryRule};
use serde::{Deserialize, Serialize};

/// Settings endpoint path
pub const SETTINGS_PATH: &str = "/lora/settings";
/// Hardware band table endpoint path
pub const BANDS_PATH: &str = "/lora/bands";
/// Regulatory table endpoint path
pub const REGULATORY_PATH: &str = "/lora/regulatory";

/// The settings document as it travels over the wire.
///
/// The radio parameters plus the channel AES key that rides alongside
/// them. The key is outside engine scope and carried opaquely: parsed,
/// kept, and written back unmodified on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// The engine-owned radio parameters
    #[serde(flatten)]
    pub params: RadioParameters,
    /// Opaque 64-hex-character channel key, if the device sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aes_key: Option<String>,
}

impl SettingsDocument {
    /// Wrap bare parameters with no key ridealong
    pub fn new(params: RadioParameters) -> Self {
        Self {
            params,
            aes_key: None,
        }
    }
}

/// The two shapes the band table endpoint is known to produce: a bare
/// array, or an envelope object (the firmware's embedded JSON uses the
/// `HardwareProfiles` key).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BandsPayload {
    Bare(Vec<HardwareBandProfile>),
    Wrapped {
        #[serde(alias = "HardwareProfiles")]
        bands: Vec<HardwareBandProfile>,
    },
}

impl BandsPayload {
    fn into_profiles(self) -> Vec<HardwareBandProfile> {
        match self {
            BandsPayload::Bare(profiles) => profiles,
            BandsPayload::Wrapped { bands } => bands,
        }
    }
}

/// Regulatory endpoint payload: region display list plus the rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryPayload {
    /// Regions offered for selection
    pub regions: Vec<Region>,
    /// Rules keyed by (region, hardware band)
    pub compliance: Vec<RegulatoryRule>,
}

/// Parse a settings document from the settings endpoint.
pub fn parse_settings(json: &str) -> Result<SettingsDocument> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a settings document for the save request body.
pub fn settings_body(doc: &SettingsDocument) -> Result<String> {
    Ok(serde_json::to_string(doc)?)
}

/// Parse the band table endpoint payload into profiles.
pub fn parse_bands(json: &str) -> Result<Vec<HardwareBandProfile>> {
    let payload: BandsPayload = serde_json::from_str(json)?;
    Ok(payload.into_profiles())
}

/// Parse the regulatory endpoint payload.
pub fn parse_regulatory(json: &str) -> Result<RegulatoryPayload> {
    Ok(serde_json::from_str(json)?)
}

/// Build validated reference tables from the two fetched payloads.
pub fn tables_from_wire(
    bands_json: &str,
    regulatory_json: &str,
) -> Result<ReferenceTables> {
    let bands = parse_bands(bands_json)?;
    let regulatory = parse_regulatory(regulatory_json)?;
    ReferenceTables::new(bands, regulatory.regions, regulatory.compliance)
}
