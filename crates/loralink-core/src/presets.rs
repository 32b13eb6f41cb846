//! Named parameter presets and active-preset detection.
//!
//! The catalog maps deployment scenarios to concrete modulation tuples.
//! Applying a preset only touches the four modulation fields; frequency,
//! band and regulatory domain are left alone. Detection is the inverse
//! mapping: exact four-field equality against the catalog, first match
//! wins, no match is simply `None`.

use crate::params::{Bandwidth, CodingRate, RadioParameters, SpreadingFactor};

/// A named modulation parameter preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Display name
    pub name: &'static str,
    /// Spreading factor to apply
    pub spreading_factor: SpreadingFactor,
    /// Bandwidth to apply
    pub bandwidth: Bandwidth,
    /// Coding rate to apply
    pub coding_rate: CodingRate,
    /// TX power to apply in dBm
    pub tx_power_dbm: i8,
    /// One-line description
    pub description: &'static str,
}

/// The static preset catalog, in display order.
const CATALOG: [Preset; 3] = [
    Preset {
        name: "Conference (100m)",
        spreading_factor: SpreadingFactor::SF7,
        bandwidth: Bandwidth::Bw500kHz,
        coding_rate: CodingRate::CR4_5,
        tx_power_dbm: 14,
        description: "Fast, low latency",
    },
    Preset {
        name: "Auditorium (250m)",
        spreading_factor: SpreadingFactor::SF9,
        bandwidth: Bandwidth::Bw125kHz,
        coding_rate: CodingRate::CR4_7,
        tx_power_dbm: 14,
        description: "Balanced range",
    },
    Preset {
        name: "Stadium (500m)",
        spreading_factor: SpreadingFactor::SF10,
        bandwidth: Bandwidth::Bw125kHz,
        coding_rate: CodingRate::CR4_8,
        tx_power_dbm: 17,
        description: "Maximum range",
    },
];

/// The preset catalog, in display order.
pub fn catalog() -> &'static [Preset] {
    &CATALOG
}

/// Overwrite the modulation fields of `params` with the preset's values.
///
/// `frequency_hz`, `band_id` and `regulatory_domain` are untouched.
pub fn apply_preset(params: &mut RadioParameters, preset: &Preset) {
    params.spreading_factor = preset.spreading_factor;
    params.bandwidth = preset.bandwidth;
    params.coding_rate = preset.coding_rate;
    params.tx_power_dbm = preset.tx_power_dbm;
}

/// Find the catalog preset whose four modulation fields exactly equal the
/// record's. Catalog order is the tie-break; no match returns `None`.
pub fn detect_active_preset(params: &RadioParameters) -> Option<&'static Preset> {
    CATALOG.iter().find(|p| {
        p.spreading_factor == params.spreading_factor
            && p.bandwidth == params.bandwidth
            && p.coding_rate == params.coding_rate
            && p.tx_power_dbm == params.tx_power_dbm
    })
}
