//! Error types for the link parameter engine.

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// Band id not present in the hardware band table
    #[error("unknown hardware band: {0}")]
    UnknownBand(String),

    /// Hardware band and regulatory rule have no frequency overlap
    #[error("no legal configuration for band {band_id} in region {region}: allowed frequency range is empty")]
    EmptyEnvelope {
        /// Hardware band id
        band_id: String,
        /// Regulatory region id
        region: String,
    },

    /// Spreading factor outside 7..=12
    #[error("invalid spreading factor: {0} (expected 7-12)")]
    InvalidSpreadingFactor(u8),

    /// Bandwidth not one of 125/250/500 kHz
    #[error("invalid bandwidth: {0} Hz (expected 125000, 250000 or 500000)")]
    InvalidBandwidth(u32),

    /// Coding rate outside 5..=8
    #[error("invalid coding rate: {0} (expected 5-8 for 4/5..4/8)")]
    InvalidCodingRate(u8),

    /// `confirm` called with no band change awaiting confirmation
    #[error("no band change awaiting confirmation")]
    NoPendingBandChange,

    /// Wire payload failed to parse or validate
    #[error("malformed wire payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Reference tables failed structural validation
    #[error("reference data rejected: {0}")]
    BadReferenceData(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
