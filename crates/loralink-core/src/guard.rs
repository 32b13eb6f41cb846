//! Confirmation workflow gating hardware band changes.
//!
//! The hardware band is fixed by the installed radio module; a
//! software-only change would silently desynchronize the configured band
//! from the hardware. Every band change therefore passes through a
//! two-state confirmation machine:
//!
//! ```text
//! Idle --select_band(X)--> PendingConfirmation(X) --confirm--> Idle (committed)
//!                                   |
//!                                   +------------ cancel ----> Idle (discarded)
//! ```
//!
//! Selecting a band never mutates the settings record. Only `confirm`
//! commits: it sets `band_id`, recenters `frequency_hz` on the new band,
//! clamps TX power to the band's limit, and re-resolves the compliance
//! envelope.

use crate::compliance::{self, ComplianceEnvelope};
use crate::error::{EngineError, Result};
use crate::params::RadioParameters;
use crate::tables::ReferenceTables;
use tracing::info;

/// Two-state confirmation machine for band changes.
#[derive(Debug, Clone, Default)]
pub struct BandChangeGuard {
    pending: Option<String>,
}

impl BandChangeGuard {
    /// Create a guard in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a band change for confirmation.
    ///
    /// Replaces any previously staged candidate. The settings record is
    /// not touched.
    pub fn select_band(&mut self, band_id: &str) {
        self.pending = Some(band_id.to_string());
    }

    /// The staged candidate band id, if any
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Whether a band change is awaiting confirmation
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Discard the staged candidate, leaving the settings record unchanged.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Commit the staged band change.
    ///
    /// Sets `band_id`, resets `frequency_hz` to the new band's center,
    /// clamps `tx_power_dbm` to the band's maximum, then re-resolves and
    /// returns the compliance envelope for the committed state.
    ///
    /// With no staged candidate this is [`EngineError::NoPendingBandChange`].
    /// An unknown candidate band id discards the candidate and leaves the
    /// settings record untouched.
    pub fn confirm(
        &mut self,
        params: &mut RadioParameters,
        tables: &ReferenceTables,
    ) -> Result<ComplianceEnvelope> {
        let candidate = self.pending.take().ok_or(EngineError::NoPendingBandChange)?;

        let band = tables
            .band(&candidate)
            .ok_or(EngineError::UnknownBand(candidate))?;

        params.band_id = band.id.clone();
        params.frequency_hz = u64::from(band.center_khz) * 1000;
        params.tx_power_dbm = params.tx_power_dbm.min(band.max_power_dbm);

        info!(
            band_id = %params.band_id,
            frequency_hz = params.frequency_hz,
            "hardware band change confirmed"
        );

        compliance::resolve(tables, &params.band_id, params.regulatory_domain.as_deref())
    }
}
