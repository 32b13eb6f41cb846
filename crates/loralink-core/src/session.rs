//! The in-memory editing session tying the engine components together.
//!
//! One [`LinkSession`] owns the settings record; all edits go through its
//! mutators, and each mutation explicitly re-derives the displayed
//! [`PerformanceEstimate`] — a pure recomputation, not an observer, so
//! there is no order-of-update ambiguity. Band selection is routed
//! through the [`BandChangeGuard`]; saving is gated on the resolved
//! compliance envelope.
//!
//! ```text
//! edit ──> RadioParameters ──> estimate (recomputed synchronously)
//! save ──> resolve envelope ──> check ──> Ready(document) | Blocked(violations)
//! band ──> guard.select ──> confirm/cancel
//! ```

use crate::compliance::{self, ComplianceEnvelope, Violation};
use crate::error::Result;
use crate::estimate::{self, PerformanceEstimate};
use crate::guard::BandChangeGuard;
use crate::params::{Bandwidth, CodingRate, RadioParameters, SpreadingFactor};
use crate::presets::{self, Preset};
use crate::tables::ReferenceTables;
use crate::wire::SettingsDocument;
use tracing::{debug, warn};

/// Outcome of the last save attempt, as shown in the console status line.
///
/// Deliberately unstructured: the device reports success or failure and
/// nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// No save attempted, or the status was cleared
    #[default]
    Idle,
    /// Last save succeeded
    Success,
    /// Last save failed (network or server-side rejection)
    Error,
}

/// Result of the save gate.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveGate {
    /// Settings are compliant; POST this document
    Ready(SettingsDocument),
    /// Settings violate the envelope; do not issue the request
    Blocked(Vec<Violation>),
}

/// The editing session for one settings record.
#[derive(Debug, Clone)]
pub struct LinkSession {
    params: RadioParameters,
    tables: ReferenceTables,
    guard: BandChangeGuard,
    estimate: PerformanceEstimate,
    status: SaveStatus,
    aes_key: Option<String>,
}

impl LinkSession {
    /// Start a session with factory default settings.
    pub fn new(tables: ReferenceTables) -> Self {
        let params = RadioParameters::default();
        let estimate = estimate::estimate(&params);
        Self {
            params,
            tables,
            guard: BandChangeGuard::new(),
            estimate,
            status: SaveStatus::Idle,
            aes_key: None,
        }
    }

    /// Adopt settings loaded from the device. A failed load leaves the
    /// current (default) settings in place, per the console's policy of
    /// not surfacing load errors.
    pub fn load_settings(&mut self, fetched: Result<SettingsDocument>) {
        match fetched {
            Ok(doc) => {
                self.params = doc.params;
                self.aes_key = doc.aes_key;
                self.refresh_estimate();
            }
            Err(err) => {
                debug!(error = %err, "settings load failed, keeping defaults");
            }
        }
    }

    /// The current settings record
    pub fn params(&self) -> &RadioParameters {
        &self.params
    }

    /// The reference tables this session resolves against
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// The current display estimate (always consistent with `params`)
    pub fn estimate(&self) -> &PerformanceEstimate {
        &self.estimate
    }

    /// The envelope for the current band/domain, for live validation UI.
    pub fn envelope(&self) -> Result<ComplianceEnvelope> {
        compliance::resolve(
            &self.tables,
            &self.params.band_id,
            self.params.regulatory_domain.as_deref(),
        )
    }

    /// Set the carrier frequency in Hz
    pub fn set_frequency_hz(&mut self, frequency_hz: u64) {
        self.params.frequency_hz = frequency_hz;
        self.refresh_estimate();
    }

    /// Set the spreading factor
    pub fn set_spreading_factor(&mut self, sf: SpreadingFactor) {
        self.params.spreading_factor = sf;
        self.refresh_estimate();
    }

    /// Set the bandwidth
    pub fn set_bandwidth(&mut self, bw: Bandwidth) {
        self.params.bandwidth = bw;
        self.refresh_estimate();
    }

    /// Set the coding rate
    pub fn set_coding_rate(&mut self, cr: CodingRate) {
        self.params.coding_rate = cr;
        self.refresh_estimate();
    }

    /// Set the TX power in dBm. Out-of-envelope values are allowed while
    /// editing; they block the save, not the edit.
    pub fn set_tx_power_dbm(&mut self, dbm: i8) {
        self.params.tx_power_dbm = dbm;
        self.refresh_estimate();
    }

    /// Set or clear the regulatory domain
    pub fn set_regulatory_domain(&mut self, domain: Option<String>) {
        self.params.regulatory_domain = domain.filter(|d| !d.is_empty());
        self.refresh_estimate();
    }

    /// Apply a named preset (modulation fields only)
    pub fn apply_preset(&mut self, preset: &Preset) {
        presets::apply_preset(&mut self.params, preset);
        self.refresh_estimate();
    }

    /// The catalog preset matching the current settings, if any
    pub fn active_preset(&self) -> Option<&'static Preset> {
        presets::detect_active_preset(&self.params)
    }

    /// Stage a hardware band change; the record is untouched until
    /// [`confirm_band_change`](Self::confirm_band_change).
    pub fn select_band(&mut self, band_id: &str) {
        self.guard.select_band(band_id);
    }

    /// The staged band candidate, if a change is awaiting confirmation
    pub fn pending_band_change(&self) -> Option<&str> {
        self.guard.pending()
    }

    /// Commit the staged band change and return the new envelope.
    pub fn confirm_band_change(&mut self) -> Result<ComplianceEnvelope> {
        let envelope = self.guard.confirm(&mut self.params, &self.tables)?;
        self.refresh_estimate();
        Ok(envelope)
    }

    /// Discard the staged band change.
    pub fn cancel_band_change(&mut self) {
        self.guard.cancel();
    }

    /// Run the save gate: validate against the resolved envelope and
    /// either produce the wire document or the blocking violations.
    ///
    /// An unknown band or an empty envelope is a hard error — the
    /// configuration cannot legally be saved at all.
    pub fn prepare_save(&self) -> Result<SaveGate> {
        let envelope = self.envelope()?;
        let violations = envelope.check(&self.params);
        if violations.is_empty() {
            Ok(SaveGate::Ready(SettingsDocument {
                params: self.params.clone(),
                aes_key: self.aes_key.clone(),
            }))
        } else {
            warn!(count = violations.len(), "save blocked by compliance violations");
            Ok(SaveGate::Blocked(violations))
        }
    }

    /// Record the outcome the console observed for the POST.
    pub fn record_save_result(&mut self, ok: bool) {
        self.status = if ok {
            SaveStatus::Success
        } else {
            SaveStatus::Error
        };
    }

    /// The last save outcome
    pub fn save_status(&self) -> SaveStatus {
        self.status
    }

    /// Reset the status line to idle (the console does this after a
    /// few seconds)
    pub fn clear_save_status(&mut self) {
        self.status = SaveStatus::Idle;
    }

    fn refresh_estimate(&mut self) {
        self.estimate = estimate::estimate(&self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn session() -> LinkSession {
        LinkSession::new(ReferenceTables::builtin())
    }

    #[test]
    fn test_estimate_refreshes_on_every_mutation() {
        let mut s = session();
        let initial = s.estimate().clone();

        s.set_spreading_factor(SpreadingFactor::SF12);
        let after_sf = s.estimate().clone();
        assert!(after_sf.time_on_air_ms > initial.time_on_air_ms);
        assert!(after_sf.range_m > initial.range_m);

        s.set_bandwidth(Bandwidth::Bw125kHz);
        let after_bw = s.estimate().clone();
        assert!(after_bw.time_on_air_ms > after_sf.time_on_air_ms);

        s.set_tx_power_dbm(20);
        assert!(s.estimate().range_m > after_bw.range_m);
    }

    #[test]
    fn test_failed_settings_load_keeps_defaults() {
        let mut s = session();
        s.load_settings(Err(EngineError::BadReferenceData(
            "device unreachable".to_string(),
        )));
        assert_eq!(s.params(), &RadioParameters::default());
    }

    #[test]
    fn test_loaded_settings_adopted_with_key() {
        let mut s = session();
        let doc = SettingsDocument {
            params: RadioParameters {
                frequency_hz: 915_000_000,
                band_id: "HW_915".to_string(),
                ..RadioParameters::default()
            },
            aes_key: Some("ab".repeat(32)),
        };
        s.load_settings(Ok(doc.clone()));
        assert_eq!(s.params().frequency_hz, 915_000_000);

        // The key rides back out on save
        match s.prepare_save().unwrap() {
            SaveGate::Ready(out) => assert_eq!(out.aes_key, doc.aes_key),
            SaveGate::Blocked(v) => panic!("unexpected block: {v:?}"),
        }
    }

    #[test]
    fn test_save_gate_accepts_boundary() {
        let mut s = session();
        s.set_regulatory_domain(Some("EU".to_string()));
        s.set_frequency_hz(870_000_000); // exact envelope edge
        assert!(matches!(s.prepare_save().unwrap(), SaveGate::Ready(_)));
    }

    #[test]
    fn test_save_gate_blocks_out_of_envelope() {
        let mut s = session();
        s.set_frequency_hz(880_000_000);
        match s.prepare_save().unwrap() {
            SaveGate::Blocked(violations) => {
                assert_eq!(violations.len(), 1);
            }
            SaveGate::Ready(_) => panic!("expected block"),
        }
    }

    #[test]
    fn test_save_gate_blocks_excess_power() {
        let mut s = session();
        s.set_tx_power_dbm(20); // HW_868 allows 14
        assert!(matches!(s.prepare_save().unwrap(), SaveGate::Blocked(_)));
    }

    #[test]
    fn test_band_change_flow_through_session() {
        let mut s = session();
        s.select_band("HW_433");
        assert_eq!(s.pending_band_change(), Some("HW_433"));
        assert_eq!(s.params().band_id, "HW_868");

        let envelope = s.confirm_band_change().unwrap();
        assert_eq!(s.params().band_id, "HW_433");
        assert_eq!(s.params().frequency_hz, 433_000_000);
        assert_eq!(envelope.power_max_dbm, 10);
        assert!(s.pending_band_change().is_none());
    }

    #[test]
    fn test_unknown_band_in_settings_is_hard_save_error() {
        let mut s = session();
        s.load_settings(Ok(SettingsDocument::new(RadioParameters {
            band_id: "HW_999".to_string(),
            ..RadioParameters::default()
        })));
        assert!(matches!(
            s.prepare_save(),
            Err(EngineError::UnknownBand(_))
        ));
    }

    #[test]
    fn test_save_status_flag() {
        let mut s = session();
        assert_eq!(s.save_status(), SaveStatus::Idle);
        s.record_save_result(true);
        assert_eq!(s.save_status(), SaveStatus::Success);
        s.record_save_result(false);
        assert_eq!(s.save_status(), SaveStatus::Error);
        s.clear_save_status();
        assert_eq!(s.save_status(), SaveStatus::Idle);
    }

    #[test]
    fn test_preset_application_via_session() {
        let mut s = session();
        let preset = &presets::catalog()[1];
        s.apply_preset(preset);
        assert_eq!(s.active_preset().unwrap().name, preset.name);
        // Frequency untouched by the preset
        assert_eq!(s.params().frequency_hz, 868_000_000);
    }
}
