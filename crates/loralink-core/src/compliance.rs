//! Compliance envelope resolution and save-time validation.
//!
//! The envelope is the intersection of what the installed radio module
//! supports and what the selected regulatory domain allows. It is derived
//! on demand and never stored: both the live validation UI and the save
//! gate call [`resolve`] against the current settings.

use crate::error::{EngineError, Result};
use crate::params::RadioParameters;
use crate::tables::ReferenceTables;
use std::fmt;

/// The resolved frequency/power limits currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceEnvelope {
    /// Lowest allowed frequency in Hz (inclusive)
    pub freq_min_hz: u64,
    /// Highest allowed frequency in Hz (inclusive)
    pub freq_max_hz: u64,
    /// Maximum allowed TX power in dBm (inclusive)
    pub power_max_dbm: i8,
}

impl ComplianceEnvelope {
    /// Whether a frequency lies inside the envelope (boundary-inclusive)
    pub fn contains_frequency(&self, frequency_hz: u64) -> bool {
        frequency_hz >= self.freq_min_hz && frequency_hz <= self.freq_max_hz
    }

    /// Validate a settings record against this envelope.
    ///
    /// Returns the violations that must block persistence; empty means the
    /// record may be saved. Boundary values are legal.
    pub fn check(&self, params: &RadioParameters) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !self.contains_frequency(params.frequency_hz) {
            violations.push(Violation::FrequencyOutOfRange {
                frequency_hz: params.frequency_hz,
                freq_min_hz: self.freq_min_hz,
                freq_max_hz: self.freq_max_hz,
            });
        }
        if params.tx_power_dbm > self.power_max_dbm {
            violations.push(Violation::PowerExceedsLimit {
                tx_power_dbm: params.tx_power_dbm,
                power_max_dbm: self.power_max_dbm,
            });
        }
        violations
    }
}

/// A single save-blocking constraint violation.
///
/// Violations are surfaced as inline warnings in the console, so each
/// carries enough detail to render a message; they are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Frequency outside the resolved envelope
    FrequencyOutOfRange {
        frequency_hz: u64,
        freq_min_hz: u64,
        freq_max_hz: u64,
    },
    /// TX power above the resolved limit
    PowerExceedsLimit { tx_power_dbm: i8, power_max_dbm: i8 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::FrequencyOutOfRange {
                frequency_hz,
                freq_min_hz,
                freq_max_hz,
            } => write!(
                f,
                "frequency {:.3} MHz outside allowed range {:.3}-{:.3} MHz",
                *frequency_hz as f64 / 1e6,
                *freq_min_hz as f64 / 1e6,
                *freq_max_hz as f64 / 1e6
            ),
            Violation::PowerExceedsLimit {
                tx_power_dbm,
                power_max_dbm,
            } => write!(
                f,
                "TX power {} dBm exceeds allowed maximum {} dBm",
                tx_power_dbm, power_max_dbm
            ),
        }
    }
}

/// Resolve the compliance envelope for a hardware band and optional
/// regulatory domain.
///
/// With no domain set, or no rule for the (domain, band) pair, the
/// envelope equals the hardware profile's own limits. Otherwise the rule
/// is intersected with the profile. An inverted intersection means no
/// legal configuration exists for the pairing and is a hard error
/// ([`EngineError::EmptyEnvelope`]); the resolver never clamps.
pub fn resolve(
    tables: &ReferenceTables,
    band_id: &str,
    regulatory_domain: Option<&str>,
) -> Result<ComplianceEnvelope> {
    let band = tables
        .band(band_id)
        .ok_or_else(|| EngineError::UnknownBand(band_id.to_string()))?;

    let rule = regulatory_domain.and_then(|domain| tables.rule(domain, band_id));

    let envelope = match rule {
        Some(rule) => {
            let freq_min_khz = band.min_khz.max(rule.freq_min_khz);
            let freq_max_khz = band.max_khz.min(rule.freq_max_khz);
            if freq_min_khz > freq_max_khz {
                return Err(EngineError::EmptyEnvelope {
                    band_id: band_id.to_string(),
                    region: rule.region.clone(),
                });
            }
            ComplianceEnvelope {
                freq_min_hz: u64::from(freq_min_khz) * 1000,
                freq_max_hz: u64::from(freq_max_khz) * 1000,
                power_max_dbm: band.max_power_dbm.min(rule.max_power_dbm),
            }
        }
        None => ComplianceEnvelope {
            freq_min_hz: u64::from(band.min_khz) * 1000,
            freq_max_hz: u64::from(band.max_khz) * 1000,
            power_max_dbm: band.max_power_dbm,
        },
    };

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{HardwareBandProfile, RegulatoryRule, ReferenceTables};

    fn tables_with_rule(rule_min_khz: u32, rule_max_khz: u32) -> ReferenceTables {
        let band = HardwareBandProfile {
            id: "HW_868".to_string(),
            name: "868 MHz Band".to_string(),
            center_khz: 868_000,
            min_khz: 863_000,
            max_khz: 870_000,
            max_power_dbm: 14,
        };
        let rule = RegulatoryRule {
            region: "EU".to_string(),
            hardware_id: "HW_868".to_string(),
            freq_min_khz: rule_min_khz,
            freq_max_khz: rule_max_khz,
            max_power_dbm: 14,
        };
        ReferenceTables::new(vec![band], vec![], vec![rule]).unwrap()
    }

    #[test]
    fn test_intersection_with_rule() {
        let tables = tables_with_rule(863_000, 868_000);
        let envelope = resolve(&tables, "HW_868", Some("EU")).unwrap();
        assert_eq!(envelope.freq_min_hz, 863_000_000);
        assert_eq!(envelope.freq_max_hz, 868_000_000);
        assert_eq!(envelope.power_max_dbm, 14);
    }

    #[test]
    fn test_no_domain_uses_hardware_limits() {
        let tables = tables_with_rule(863_000, 868_000);
        let envelope = resolve(&tables, "HW_868", None).unwrap();
        assert_eq!(envelope.freq_min_hz, 863_000_000);
        assert_eq!(envelope.freq_max_hz, 870_000_000);
        assert_eq!(envelope.power_max_dbm, 14);
    }

    #[test]
    fn test_unmatched_domain_uses_hardware_limits() {
        let tables = tables_with_rule(863_000, 868_000);
        let envelope = resolve(&tables, "HW_868", Some("US")).unwrap();
        assert_eq!(envelope.freq_max_hz, 870_000_000);
    }

    #[test]
    fn test_missing_band_is_hard_error() {
        let tables = ReferenceTables::builtin();
        let result = resolve(&tables, "HW_2400", None);
        assert!(matches!(result, Err(EngineError::UnknownBand(_))));
    }

    #[test]
    fn test_inverted_intersection_is_empty_envelope() {
        // Rule entirely below the hardware band
        let tables = tables_with_rule(400_000, 450_000);
        let result = resolve(&tables, "HW_868", Some("EU"));
        assert!(matches!(result, Err(EngineError::EmptyEnvelope { .. })));
    }

    #[test]
    fn test_power_limit_takes_stricter_side() {
        let tables = ReferenceTables::builtin();
        // US rule allows 30 dBm, HW_915 module tops out at 17
        let envelope = resolve(&tables, "HW_915", Some("US")).unwrap();
        assert_eq!(envelope.power_max_dbm, 17);
        // JP rule (13 dBm) is stricter than the module
        let envelope = resolve(&tables, "HW_915", Some("JP")).unwrap();
        assert_eq!(envelope.power_max_dbm, 13);
    }

    #[test]
    fn test_check_boundary_inclusive() {
        let tables = tables_with_rule(863_000, 868_000);
        let envelope = resolve(&tables, "HW_868", Some("EU")).unwrap();

        let mut params = RadioParameters::default();
        params.frequency_hz = 868_000_000; // exact upper boundary
        assert!(envelope.check(&params).is_empty());

        params.frequency_hz = 868_001_000;
        let violations = envelope.check(&params);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            Violation::FrequencyOutOfRange { .. }
        ));
    }

    #[test]
    fn test_check_power_violation() {
        let tables = tables_with_rule(863_000, 868_000);
        let envelope = resolve(&tables, "HW_868", Some("EU")).unwrap();

        let mut params = RadioParameters::default();
        params.tx_power_dbm = 20;
        let violations = envelope.check(&params);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::PowerExceedsLimit { .. })));

        params.tx_power_dbm = 14; // exact limit is legal
        assert!(envelope.check(&params).is_empty());
    }
}
