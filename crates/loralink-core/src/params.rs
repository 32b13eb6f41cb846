//! Radio link parameters and the validated modulation parameter types.
//!
//! The settings record the console edits is [`RadioParameters`]. Its
//! modulation fields use dedicated enum types so that the range invariants
//! (SF 7-12, BW 125/250/500 kHz, CR 4/5-4/8) hold by construction; raw
//! wire values outside those ranges are rejected at deserialization time.
//!
//! ## Parameter overview
//!
//! | Parameter | Range | Effect |
//! |-----------|-------|--------|
//! | Spreading factor | SF7-SF12 | higher = longer range, lower data rate |
//! | Bandwidth | 125/250/500 kHz | wider = faster, shorter range |
//! | Coding rate | 4/5-4/8 | more redundancy = more robust, more airtime |
//! | TX power | dBm | bounded by the resolved compliance envelope |

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Spreading factor for LoRa chirp spread-spectrum modulation.
///
/// Determines chips per symbol (2^SF) and bits per symbol (SF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpreadingFactor {
    SF7 = 7,
    SF8 = 8,
    SF9 = 9,
    SF10 = 10,
    SF11 = 11,
    SF12 = 12,
}

impl SpreadingFactor {
    /// Create a spreading factor from a raw value
    pub fn from_u8(value: u8) -> Result<Self, EngineError> {
        match value {
            7 => Ok(Self::SF7),
            8 => Ok(Self::SF8),
            9 => Ok(Self::SF9),
            10 => Ok(Self::SF10),
            11 => Ok(Self::SF11),
            12 => Ok(Self::SF12),
            _ => Err(EngineError::InvalidSpreadingFactor(value)),
        }
    }

    /// Get the raw value
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Number of chips per symbol (2^SF)
    pub fn chips_per_symbol(&self) -> u32 {
        1 << self.value()
    }

    /// All spreading factors, ascending
    pub fn all() -> [Self; 6] {
        [
            Self::SF7,
            Self::SF8,
            Self::SF9,
            Self::SF10,
            Self::SF11,
            Self::SF12,
        ]
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<SpreadingFactor> for u8 {
    fn from(sf: SpreadingFactor) -> u8 {
        sf.value()
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.value())
    }
}

impl Default for SpreadingFactor {
    fn default() -> Self {
        Self::SF7
    }
}

/// Channel bandwidth for LoRa modulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Bandwidth {
    /// 125 kHz - standard bandwidth, best sensitivity
    Bw125kHz = 125_000,
    /// 250 kHz - doubled bandwidth
    Bw250kHz = 250_000,
    /// 500 kHz - maximum bandwidth, fastest
    Bw500kHz = 500_000,
}

impl Bandwidth {
    /// Create a bandwidth from a value in Hz
    pub fn from_hz(hz: u32) -> Result<Self, EngineError> {
        match hz {
            125_000 => Ok(Self::Bw125kHz),
            250_000 => Ok(Self::Bw250kHz),
            500_000 => Ok(Self::Bw500kHz),
            _ => Err(EngineError::InvalidBandwidth(hz)),
        }
    }

    /// Get the bandwidth in Hz
    pub fn hz(&self) -> u32 {
        *self as u32
    }

    /// All bandwidths, ascending
    pub fn all() -> [Self; 3] {
        [Self::Bw125kHz, Self::Bw250kHz, Self::Bw500kHz]
    }
}

impl TryFrom<u32> for Bandwidth {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_hz(value)
    }
}

impl From<Bandwidth> for u32 {
    fn from(bw: Bandwidth) -> u32 {
        bw.hz()
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.hz() / 1000)
    }
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self::Bw125kHz
    }
}

/// Coding rate for forward error correction.
///
/// Carries the 5..8 denominator form the device wire protocol speaks
/// (4/5 is encoded as 5, 4/8 as 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CodingRate {
    /// 4/5 - minimal redundancy, highest throughput
    CR4_5 = 5,
    /// 4/6 - light FEC
    CR4_6 = 6,
    /// 4/7 - medium FEC
    CR4_7 = 7,
    /// 4/8 - maximum FEC, most robust
    CR4_8 = 8,
}

impl CodingRate {
    /// Create a coding rate from the 5..8 denominator value
    pub fn from_u8(value: u8) -> Result<Self, EngineError> {
        match value {
            5 => Ok(Self::CR4_5),
            6 => Ok(Self::CR4_6),
            7 => Ok(Self::CR4_7),
            8 => Ok(Self::CR4_8),
            _ => Err(EngineError::InvalidCodingRate(value)),
        }
    }

    /// Get the denominator value (5..8)
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Number of redundant bits per 4 data bits (1..4)
    pub fn redundancy_bits(&self) -> u8 {
        self.value() - 4
    }

    /// Coding rate as a fraction (4/5 .. 4/8)
    pub fn rate(&self) -> f64 {
        4.0 / f64::from(self.value())
    }
}

impl TryFrom<u8> for CodingRate {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<CodingRate> for u8 {
    fn from(cr: CodingRate) -> u8 {
        cr.value()
    }
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "4/{}", self.value())
    }
}

impl Default for CodingRate {
    fn default() -> Self {
        Self::CR4_5
    }
}

/// The mutable radio link settings record.
///
/// Loaded once from the device, edited in memory by the console, and
/// persisted by an explicit save (last-write-wins). `band_id` only changes
/// through the [`BandChangeGuard`](crate::guard::BandChangeGuard)
/// confirmation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioParameters {
    /// Carrier frequency in Hz
    pub frequency_hz: u64,
    /// Spreading factor (SF7-SF12)
    pub spreading_factor: SpreadingFactor,
    /// Channel bandwidth
    #[serde(rename = "bandwidth_hz")]
    pub bandwidth: Bandwidth,
    /// FEC coding rate
    pub coding_rate: CodingRate,
    /// Transmit power in dBm
    pub tx_power_dbm: i8,
    /// Hardware band id (e.g. "HW_868"); fixed by the installed radio module
    pub band_id: String,
    /// Regulatory domain (e.g. "EU"); `None` when not configured.
    /// The firmware stores the unset domain as an empty string.
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub regulatory_domain: Option<String>,
}

impl Default for RadioParameters {
    /// Factory settings of the 868 MHz device variant
    fn default() -> Self {
        Self {
            frequency_hz: 868_000_000,
            spreading_factor: SpreadingFactor::SF7,
            bandwidth: Bandwidth::Bw500kHz,
            coding_rate: CodingRate::CR4_5,
            tx_power_dbm: 14,
            band_id: "HW_868".to_string(),
            regulatory_domain: None,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
