//! Vapor pressure deficit from air temperature and relative humidity.
//!
//! Saturation pressure uses the Tetens/Magnus form
//! `svp = 0.61078 * exp(17.27 * T / (T + 237.3))` in kPa, and the deficit is
//! `svp - svp * RH / 100`, clamped at zero and rounded to two decimals.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Estimate;
use crate::config::VpdInputs;
use crate::data_models::Sample;
use crate::utils::{parse_reading, to_fixed};

const SVP_SCALE_KPA: f64 = 0.61078;
const MAGNUS_A: f64 = 17.27;
const MAGNUS_B_C: f64 = 237.3;

const FUNGAL_RISK_BELOW: f64 = 0.4;
const LOW_TRANSPIRATION_BELOW: f64 = 0.8;
const IDEAL_UP_TO: f64 = 1.2;
const HIGH_STRESS_UP_TO: f64 = 1.6;

/// VPD in kPa from raw temperature (°C) and relative humidity (%) readings.
///
/// Absent or non-numeric inputs give [`Estimate::Unavailable`].
pub fn compute(temperature: Option<&str>, humidity: Option<&str>) -> Estimate<f64> {
    let (Some(temperature), Some(humidity)) = (temperature, humidity) else {
        return Estimate::Unavailable;
    };

    let t = parse_reading(temperature);
    let h = parse_reading(humidity);
    if t.is_nan() || h.is_nan() {
        return Estimate::Unavailable;
    }

    vapor_pressure_deficit(t, h)
}

/// VPD for already-parsed values. A NaN deficit is unavailable; infinite
/// deficits are clamped like any other value, so `-inf` becomes 0 and `+inf`
/// stays as is.
pub fn vapor_pressure_deficit(temperature_c: f64, humidity_percent: f64) -> Estimate<f64> {
    let svp = saturation_vapor_pressure(temperature_c);
    let avp = svp * (humidity_percent / 100.0);
    let vpd = svp - avp;

    // NaN has to be caught before clamping, f64::max would swallow it.
    if vpd.is_nan() {
        return Estimate::Unavailable;
    }
    Estimate::Value(to_fixed(vpd.max(0.0), 2))
}

/// Saturation vapor pressure in kPa at `temperature_c`.
pub fn saturation_vapor_pressure(temperature_c: f64) -> f64 {
    SVP_SCALE_KPA * (MAGNUS_A * temperature_c / (temperature_c + MAGNUS_B_C)).exp()
}

/// VPD of a sample, reading the fields named by `inputs`.
pub fn compute_for_sample(sample: &Sample, inputs: &VpdInputs) -> Estimate<f64> {
    compute(sample.raw(inputs.temperature), sample.raw(inputs.humidity))
}

/// Severity bucket attached to a classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpdTier {
    Neutral,
    Optimal,
    Caution,
    Danger,
}

/// Agronomic classification bands, ordered by increasing VPD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpdBand {
    AwaitingData,
    FungalRisk,
    LowTranspiration,
    Ideal,
    HighStress,
    DehydrationRisk,
}

impl VpdBand {
    pub fn label(self) -> &'static str {
        match self {
            VpdBand::AwaitingData => "awaiting data",
            VpdBand::FungalRisk => "fungal-risk (too humid)",
            VpdBand::LowTranspiration => "low transpiration",
            VpdBand::Ideal => "ideal growth zone",
            VpdBand::HighStress => "high stress (too dry)",
            VpdBand::DehydrationRisk => "dehydration risk",
        }
    }

    pub fn tier(self) -> VpdTier {
        match self {
            VpdBand::AwaitingData => VpdTier::Neutral,
            VpdBand::FungalRisk | VpdBand::DehydrationRisk => VpdTier::Danger,
            VpdBand::LowTranspiration | VpdBand::HighStress => VpdTier::Caution,
            VpdBand::Ideal => VpdTier::Optimal,
        }
    }

    /// Band for a VPD value in kPa.
    ///
    /// 0.4 and 0.8 open the band above them, 1.2 and 1.6 close the band
    /// below them.
    pub fn for_value(vpd: f64) -> Self {
        if vpd.is_nan() {
            VpdBand::AwaitingData
        } else if vpd < FUNGAL_RISK_BELOW {
            VpdBand::FungalRisk
        } else if vpd < LOW_TRANSPIRATION_BELOW {
            VpdBand::LowTranspiration
        } else if vpd <= IDEAL_UP_TO {
            VpdBand::Ideal
        } else if vpd <= HIGH_STRESS_UP_TO {
            VpdBand::HighStress
        } else {
            VpdBand::DehydrationRisk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VpdStatus {
    pub band: VpdBand,
    pub label: &'static str,
    pub tier: VpdTier,
}

impl From<VpdBand> for VpdStatus {
    fn from(band: VpdBand) -> Self {
        Self {
            band,
            label: band.label(),
            tier: band.tier(),
        }
    }
}

impl fmt::Display for VpdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Classify a VPD result into its agronomic status.
pub fn classify(vpd: Estimate<f64>) -> VpdStatus {
    match vpd {
        Estimate::Value(value) => VpdBand::for_value(value).into(),
        Estimate::Unavailable => VpdBand::AwaitingData.into(),
    }
}
