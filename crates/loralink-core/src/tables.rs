//! Reference tables: hardware band profiles and regulatory rules.
//!
//! These catalogs are immutable once loaded. The console fetches them from
//! the device at startup; if the fetch fails the engine substitutes the
//! builtin table that matches the firmware's embedded band data, so the
//! editor always has a usable catalog (the substitution is logged, never
//! surfaced to the user).

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Frequency range and power limit of a physically installed radio module.
///
/// Read-only: the band is determined by the radio module wiring and cannot
/// be changed by software alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareBandProfile {
    /// Band id (e.g. "HW_868")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optimal center frequency in kHz
    #[serde(alias = "optimal_center_khz")]
    pub center_khz: u32,
    /// Minimum frequency in kHz
    #[serde(alias = "optimal_freq_min_khz")]
    pub min_khz: u32,
    /// Maximum frequency in kHz
    #[serde(alias = "optimal_freq_max_khz")]
    pub max_khz: u32,
    /// Maximum supported TX power in dBm
    pub max_power_dbm: i8,
}

/// Jurisdictional frequency/power constraint keyed by (region, hardware band).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryRule {
    /// Region id (e.g. "EU")
    pub region: String,
    /// Hardware band id this rule applies to
    pub hardware_id: String,
    /// Legal minimum frequency in kHz
    pub freq_min_khz: u32,
    /// Legal maximum frequency in kHz
    pub freq_max_khz: u32,
    /// Legal maximum TX power in dBm
    pub max_power_dbm: i8,
}

/// Regulatory region display entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region id (e.g. "EU")
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// Immutable catalog of band profiles, regions and regulatory rules.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    bands: Vec<HardwareBandProfile>,
    regions: Vec<Region>,
    compliance: Vec<RegulatoryRule>,
}

impl ReferenceTables {
    /// Build tables from fetched catalog data, validating structure.
    ///
    /// Fails fast on an empty band list or a band whose frequency range is
    /// inverted; a rule referencing an unknown band is kept but inert
    /// (it can never match a lookup) and logged.
    pub fn new(
        bands: Vec<HardwareBandProfile>,
        regions: Vec<Region>,
        compliance: Vec<RegulatoryRule>,
    ) -> Result<Self> {
        if bands.is_empty() {
            return Err(EngineError::BadReferenceData(
                "hardware band table is empty".to_string(),
            ));
        }
        for band in &bands {
            if band.min_khz > band.max_khz {
                return Err(EngineError::BadReferenceData(format!(
                    "band {} has inverted frequency range {}..{} kHz",
                    band.id, band.min_khz, band.max_khz
                )));
            }
        }
        for rule in &compliance {
            if !bands.iter().any(|b| b.id == rule.hardware_id) {
                warn!(
                    region = %rule.region,
                    hardware_id = %rule.hardware_id,
                    "regulatory rule references unknown hardware band"
                );
            }
        }
        debug!(
            bands = bands.len(),
            regions = regions.len(),
            rules = compliance.len(),
            "reference tables loaded"
        );
        Ok(Self {
            bands,
            regions,
            compliance,
        })
    }

    /// The builtin fallback catalog.
    ///
    /// Mirrors the band data embedded in the device firmware: the three
    /// hardware variants (433/868/915 MHz) and the regional rule set.
    pub fn builtin() -> Self {
        let bands = vec![
            HardwareBandProfile {
                id: "HW_433".to_string(),
                name: "433 MHz Band".to_string(),
                center_khz: 433_000,
                min_khz: 430_000,
                max_khz: 440_000,
                max_power_dbm: 10,
            },
            HardwareBandProfile {
                id: "HW_868".to_string(),
                name: "868 MHz Band".to_string(),
                center_khz: 868_000,
                min_khz: 863_000,
                max_khz: 870_000,
                max_power_dbm: 14,
            },
            HardwareBandProfile {
                id: "HW_915".to_string(),
                name: "915 MHz Band".to_string(),
                center_khz: 915_000,
                min_khz: 902_000,
                max_khz: 928_000,
                max_power_dbm: 17,
            },
        ];
        let regions = vec![
            region("EU", "Europe"),
            region("US", "United States"),
            region("ANZ", "Australia / New Zealand"),
            region("JP", "Japan"),
            region("KR", "South Korea"),
            region("IN", "India"),
        ];
        let compliance = vec![
            rule("EU", "HW_868", 863_000, 870_000, 14),
            rule("EU", "HW_433", 433_050, 434_790, 10),
            rule("US", "HW_915", 902_000, 928_000, 30),
            rule("ANZ", "HW_915", 915_000, 928_000, 30),
            rule("JP", "HW_915", 920_000, 925_000, 13),
            rule("KR", "HW_915", 920_000, 923_000, 14),
            rule("IN", "HW_868", 865_000, 867_000, 30),
        ];
        // Builtin values are structurally valid by construction
        Self {
            bands,
            regions,
            compliance,
        }
    }

    /// Use fetched tables, or fall back to the builtin catalog on failure.
    pub fn load_or_builtin(fetched: Result<Self>) -> Self {
        match fetched {
            Ok(tables) => tables,
            Err(err) => {
                warn!(error = %err, "reference table fetch failed, using builtin fallback");
                Self::builtin()
            }
        }
    }

    /// All hardware band profiles
    pub fn bands(&self) -> &[HardwareBandProfile] {
        &self.bands
    }

    /// All regulatory regions
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All regulatory rules
    pub fn compliance(&self) -> &[RegulatoryRule] {
        &self.compliance
    }

    /// Look up a hardware band profile by id
    pub fn band(&self, id: &str) -> Option<&HardwareBandProfile> {
        self.bands.iter().find(|b| b.id == id)
    }

    /// Look up the regulatory rule for a (region, hardware band) pair
    pub fn rule(&self, region: &str, hardware_id: &str) -> Option<&RegulatoryRule> {
        self.compliance
            .iter()
            .find(|r| r.region == region && r.hardware_id == hardware_id)
    }

    /// Find the band whose frequency range contains the given frequency.
    ///
    /// Used by the console to label an externally-loaded frequency.
    pub fn band_for_frequency(&self, frequency_hz: u64) -> Option<&HardwareBandProfile> {
        let freq_khz = frequency_hz / 1000;
        self.bands
            .iter()
            .find(|b| freq_khz >= u64::from(b.min_khz) && freq_khz <= u64::from(b.max_khz))
    }
}

fn region(id: &str, name: &str) -> Region {
    Region {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn rule(region: &str, hardware_id: &str, min: u32, max: u32, power: i8) -> RegulatoryRule {
    RegulatoryRule {
        region: region.to_string(),
        hardware_id: hardware_id.to_string(),
        freq_min_khz: min,
        freq_max_khz: max,
        max_power_dbm: power,
    }
}
