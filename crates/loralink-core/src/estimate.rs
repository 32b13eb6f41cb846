//! On-air performance estimation: packet airtime and achievable range.
//!
//! Pure, deterministic functions over the modulation parameters. The
//! console calls these on every parameter edit to refresh the displayed
//! estimates; nothing here touches the device.
//!
//! ## Time on air
//!
//! Semtech's LoRa airtime formula: a fixed preamble of
//! `n_preamble + 4.25` symbols followed by the payload symbol count,
//! which depends on payload length, SF, CRC, header mode, coding rate and
//! the low-data-rate optimization (mandatory at SF11/SF12 with 125 kHz).
//!
//! ## Range
//!
//! The canonical model inverts free-space path loss against the link
//! budget (transmit power + antenna gains - receiver sensitivity). An
//! indoor path-loss-exponent model is available as an alternate strategy;
//! the two are never blended.

use crate::params::{Bandwidth, CodingRate, RadioParameters, SpreadingFactor};

/// Speed of light (m/s)
const C: f64 = 299_792_458.0;

/// Antenna gain assumed for the display estimate (small external whip, dBi)
pub const DEFAULT_ANTENNA_GAIN_DBI: f64 = 2.0;

/// Payload length the console's latency figure is quoted for (bytes)
pub const DISPLAY_PAYLOAD_BYTES: usize = 10;

/// Fade margin for the indoor model (dB)
const INDOOR_FADE_MARGIN_DB: f64 = 20.0;

/// Indoor path loss exponent (obstructed propagation)
const INDOOR_PATH_LOSS_EXPONENT: f64 = 3.5;

/// Indoor reference loss at 1 m (dB)
const INDOOR_REF_LOSS_DB: f64 = 50.0;

/// Frame-level inputs to the airtime formula.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Number of preamble symbols (excluding the implicit 4.25)
    pub preamble_symbols: u32,
    /// Payload CRC enabled
    pub crc_enabled: bool,
    /// Explicit (variable-length) header
    pub explicit_header: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            preamble_symbols: 8,
            crc_enabled: true,
            explicit_header: true,
        }
    }
}

/// Time on air in milliseconds for a packet with the default frame layout
/// (8 preamble symbols, CRC on, explicit header).
pub fn time_on_air_ms(
    sf: SpreadingFactor,
    bw: Bandwidth,
    cr: CodingRate,
    payload_bytes: usize,
) -> f64 {
    time_on_air_ms_with(sf, bw, cr, payload_bytes, &FrameConfig::default())
}

/// Time on air in milliseconds with an explicit frame layout.
pub fn time_on_air_ms_with(
    sf: SpreadingFactor,
    bw: Bandwidth,
    cr: CodingRate,
    payload_bytes: usize,
    frame: &FrameConfig,
) -> f64 {
    let sf_val = f64::from(sf.value());
    let bw_hz = f64::from(bw.hz());

    // Low data rate optimization is mandatory at SF11+ with 125 kHz
    let ldro = if sf.value() >= 11 && bw == Bandwidth::Bw125kHz {
        1.0
    } else {
        0.0
    };

    let t_sym = f64::from(sf.chips_per_symbol()) / bw_hz;
    let t_preamble = (f64::from(frame.preamble_symbols) + 4.25) * t_sym;

    let crc = if frame.crc_enabled { 1.0 } else { 0.0 };
    let h = if frame.explicit_header { 0.0 } else { 1.0 };

    let numerator = 8.0 * payload_bytes as f64 - 4.0 * sf_val + 28.0 + 16.0 * crc - 20.0 * h;
    let denominator = 4.0 * (sf_val - 2.0 * ldro);
    let payload_symbols =
        8.0 + ((numerator / denominator).ceil() * f64::from(cr.value())).max(0.0);

    (t_preamble + payload_symbols * t_sym) * 1000.0
}

/// Receiver sensitivity in dBm for the given modulation.
///
/// SX1262 baseline: -148 dBm at SF12/BW125, degrading 2.5 dB per SF step
/// down and 3 dB per bandwidth doubling.
pub fn sensitivity_dbm(sf: SpreadingFactor, bw: Bandwidth) -> f64 {
    let sf_term = f64::from(12 - sf.value()) * 2.5;
    let bw_term = if bw.hz() > 125_000 {
        (f64::from(bw.hz()) / 125_000.0).log2() * 3.0
    } else {
        0.0
    };
    -148.0 + sf_term + bw_term
}

/// Link budget in dB: TX power plus antenna gain at both ends minus
/// receiver sensitivity.
pub fn link_budget_db(
    sf: SpreadingFactor,
    bw: Bandwidth,
    tx_power_dbm: i8,
    antenna_gain_dbi: f64,
) -> f64 {
    f64::from(tx_power_dbm) + 2.0 * antenna_gain_dbi - sensitivity_dbm(sf, bw)
}

/// Range estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeModel {
    /// Free-space path-loss inversion (canonical; line-of-sight,
    /// optimistic over real terrain)
    #[default]
    FreeSpace,
    /// Indoor path-loss-exponent model with a fixed fade margin
    /// (obstructed propagation, conservative)
    IndoorPathLoss,
}

/// Estimated achievable range in meters.
pub fn estimate_range_m(
    sf: SpreadingFactor,
    bw: Bandwidth,
    tx_power_dbm: i8,
    frequency_hz: u64,
    antenna_gain_dbi: f64,
    model: RangeModel,
) -> f64 {
    let budget = link_budget_db(sf, bw, tx_power_dbm, antenna_gain_dbi);
    match model {
        RangeModel::FreeSpace => {
            // FSPL = 20*log10(d) + 20*log10(f) + 20*log10(4*pi/c), solved for d
            let fspl_constant = 20.0 * (frequency_hz as f64).log10()
                + 20.0 * (4.0 * std::f64::consts::PI / C).log10();
            10f64.powf((budget - fspl_constant) / 20.0)
        }
        RangeModel::IndoorPathLoss => {
            // PL(d) = ref_loss + 10*n*log10(d/1m) + fade margin, solved for d
            let usable = budget - INDOOR_FADE_MARGIN_DB - INDOOR_REF_LOSS_DB;
            10f64.powf(usable / (10.0 * INDOOR_PATH_LOSS_EXPONENT))
        }
    }
}

/// Raw LoRa data rate in bits per second.
pub fn data_rate_bps(sf: SpreadingFactor, bw: Bandwidth, cr: CodingRate) -> f64 {
    let sf_val = f64::from(sf.value());
    sf_val * (f64::from(bw.hz()) / f64::from(sf.chips_per_symbol())) * cr.rate()
}

/// The read-only metrics the console displays next to the settings form.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceEstimate {
    /// Packet airtime for the display payload, in ms
    pub time_on_air_ms: f64,
    /// Estimated achievable range in meters
    pub range_m: f64,
    /// Raw data rate in bits/s
    pub data_rate_bps: f64,
}

/// Derive the display estimate for a settings record.
///
/// Uses the canonical range model and the display payload/antenna
/// constants; referentially transparent.
pub fn estimate(params: &RadioParameters) -> PerformanceEstimate {
    estimate_with_model(params, RangeModel::default())
}

/// Derive the display estimate with an explicit range model.
pub fn estimate_with_model(params: &RadioParameters, model: RangeModel) -> PerformanceEstimate {
    PerformanceEstimate {
        time_on_air_ms: time_on_air_ms(
            params.spreading_factor,
            params.bandwidth,
            params.coding_rate,
            DISPLAY_PAYLOAD_BYTES,
        ),
        range_m: estimate_range_m(
            params.spreading_factor,
            params.bandwidth,
            params.tx_power_dbm,
            params.frequency_hz,
            DEFAULT_ANTENNA_GAIN_DBI,
            model,
        ),
        data_rate_bps: data_rate_bps(
            params.spreading_factor,
            params.bandwidth,
            params.coding_rate,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_time_on_air_literal_example() {
        // SF7, BW500, CR4/5, 16-byte payload, CRC on, explicit header:
        // t_sym = 2^7/500000 = 0.256 ms
        // preamble = 12.25 * 0.256 = 3.136 ms
        // payload symbols = 8 + ceil(144/28)*5 = 38
        // total = 3.136 + 38*0.256 = 12.864 ms
        let toa = time_on_air_ms(
            SpreadingFactor::SF7,
            Bandwidth::Bw500kHz,
            CodingRate::CR4_5,
            16,
        );
        assert!((toa - 12.864).abs() < EPS, "got {toa}");
    }

    #[test]
    fn test_time_on_air_display_payload() {
        // SF7, BW500, CR4/5, 10 bytes: 8 + ceil(96/28)*5 = 28 symbols,
        // total = (12.25 + 28) * 0.256 = 10.304 ms
        let toa = time_on_air_ms(
            SpreadingFactor::SF7,
            Bandwidth::Bw500kHz,
            CodingRate::CR4_5,
            DISPLAY_PAYLOAD_BYTES,
        );
        assert!((toa - 10.304).abs() < EPS, "got {toa}");
    }

    #[test]
    fn test_time_on_air_monotone_in_sf() {
        for bw in Bandwidth::all() {
            let sfs = SpreadingFactor::all();
            for pair in sfs.windows(2) {
                let lower = time_on_air_ms(pair[0], bw, CodingRate::CR4_5, 16);
                let higher = time_on_air_ms(pair[1], bw, CodingRate::CR4_5, 16);
                assert!(
                    higher >= lower,
                    "{} -> {} not monotone at {}",
                    pair[0],
                    pair[1],
                    bw
                );
            }
        }
    }

    #[test]
    fn test_time_on_air_monotone_in_bw() {
        for sf in SpreadingFactor::all() {
            let bws = Bandwidth::all();
            for pair in bws.windows(2) {
                let narrow = time_on_air_ms(sf, pair[0], CodingRate::CR4_8, 16);
                let wide = time_on_air_ms(sf, pair[1], CodingRate::CR4_8, 16);
                assert!(
                    wide <= narrow,
                    "{} -> {} not monotone at {}",
                    pair[0],
                    pair[1],
                    sf
                );
            }
        }
    }

    #[test]
    fn test_low_data_rate_optimization_applies() {
        // At SF11/BW125 the divisor shrinks, so the LDRO airtime must
        // differ from what the formula gives without it
        let with_ldro = time_on_air_ms(
            SpreadingFactor::SF11,
            Bandwidth::Bw125kHz,
            CodingRate::CR4_5,
            64,
        );
        // SF11/BW250 has no LDRO; normalize symbol time by doubling
        let without = time_on_air_ms(
            SpreadingFactor::SF11,
            Bandwidth::Bw250kHz,
            CodingRate::CR4_5,
            64,
        ) * 2.0;
        assert!(with_ldro > without);
    }

    #[test]
    fn test_sensitivity_model() {
        // SF12/BW125 is the baseline
        let base = sensitivity_dbm(SpreadingFactor::SF12, Bandwidth::Bw125kHz);
        assert!((base - (-148.0)).abs() < EPS);
        // SF7/BW500: -148 + 12.5 + 6 = -129.5
        let s = sensitivity_dbm(SpreadingFactor::SF7, Bandwidth::Bw500kHz);
        assert!((s - (-129.5)).abs() < EPS);
    }

    #[test]
    fn test_indoor_range_literal() {
        // SF7/BW500/14dBm/2dBi: budget = 14 + 4 + 129.5 = 147.5 dB,
        // range = 10^((147.5 - 70) / 35)
        let range = estimate_range_m(
            SpreadingFactor::SF7,
            Bandwidth::Bw500kHz,
            14,
            868_000_000,
            2.0,
            RangeModel::IndoorPathLoss,
        );
        let expected = 10f64.powf(77.5 / 35.0);
        assert!((range - expected).abs() < 1e-9, "got {range}");
    }

    #[test]
    fn test_range_models_not_blended() {
        let free = estimate_range_m(
            SpreadingFactor::SF10,
            Bandwidth::Bw125kHz,
            14,
            868_000_000,
            2.0,
            RangeModel::FreeSpace,
        );
        let indoor = estimate_range_m(
            SpreadingFactor::SF10,
            Bandwidth::Bw125kHz,
            14,
            868_000_000,
            2.0,
            RangeModel::IndoorPathLoss,
        );
        // Free space is the optimistic bound
        assert!(free > indoor);
        assert!(indoor > 0.0);
    }

    #[test]
    fn test_range_grows_with_sf_and_power() {
        let base = estimate_range_m(
            SpreadingFactor::SF7,
            Bandwidth::Bw125kHz,
            14,
            868_000_000,
            2.0,
            RangeModel::FreeSpace,
        );
        let higher_sf = estimate_range_m(
            SpreadingFactor::SF10,
            Bandwidth::Bw125kHz,
            14,
            868_000_000,
            2.0,
            RangeModel::FreeSpace,
        );
        let higher_power = estimate_range_m(
            SpreadingFactor::SF7,
            Bandwidth::Bw125kHz,
            20,
            868_000_000,
            2.0,
            RangeModel::FreeSpace,
        );
        assert!(higher_sf > base);
        assert!(higher_power > base);
    }

    #[test]
    fn test_data_rate() {
        // SF7/BW500/CR4-5: 7 * (500000/128) * 0.8 = 21875 bps
        let rate = data_rate_bps(
            SpreadingFactor::SF7,
            Bandwidth::Bw500kHz,
            CodingRate::CR4_5,
        );
        assert!((rate - 21_875.0).abs() < EPS);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let params = RadioParameters::default();
        assert_eq!(estimate(&params), estimate(&params));
    }
}
