// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{TokamakError, TokamakResult};
use crate::state::{OperatingInputs, OperatingLevels, ShapeLevels, OPERATING_LEVEL_MAX};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Named plant size envelopes. A closed set: every envelope in use is
/// one of these presets, possibly with the operator toggles applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// R ≈ 8 m class device (wide radial build, modest elongation)
    ReferenceLarge,
    /// R ≈ 6 m class device (compact build, stronger shaping)
    ReferenceCompact,
}

impl EnvelopeKind {
    /// Reference boundary shape for this envelope, for operators who
    /// want a known-good starting dee rather than the centered default.
    pub fn preset_shape(&self) -> ShapeLevels {
        match self {
            EnvelopeKind::ReferenceLarge => ShapeLevels {
                outer: 2,
                inner: 4,
                top_inner: 35,
                top_outer: 23,
            },
            EnvelopeKind::ReferenceCompact => ShapeLevels {
                outer: 20,
                inner: 20,
                top_inner: 31,
                top_outer: 17,
            },
        }
    }
}

/// Plant size envelope: the fixed radial build and shaping ceilings of
/// the device, plus the confinement and beta-limit coefficients.
///
/// Mutated only by an explicit configuration change, never by the
/// relaxation loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantEnvelope {
    /// Outer plasma boundary radius [m]
    pub r_max: f64,
    /// Inner plasma boundary radius [m]
    pub r_min: f64,
    /// Maximum elongation
    pub k_max: f64,
    /// Maximum fuelling-rate factor
    pub mdot_max: f64,
    /// Confinement multiplier applied on top of the divertor margin
    pub h_mult: f64,
    /// Troyon beta-limit coefficient
    pub troy_c: f64,
}

impl PlantEnvelope {
    pub fn preset(kind: EnvelopeKind) -> Self {
        match kind {
            EnvelopeKind::ReferenceLarge => PlantEnvelope {
                r_max: 11.0,
                r_min: 5.0,
                k_max: 1.8,
                mdot_max: 0.4,
                h_mult: 1.0,
                troy_c: 2.5,
            },
            EnvelopeKind::ReferenceCompact => PlantEnvelope {
                r_max: 8.4,
                r_min: 4.0,
                k_max: 2.1,
                mdot_max: 0.6,
                h_mult: 1.0,
                troy_c: 2.5,
            },
        }
    }

    /// Envelope midpoint radius [m]
    pub fn r_mid(&self) -> f64 {
        0.5 * (self.r_max + self.r_min)
    }

    /// Envelope half-span [m]
    pub fn a_half(&self) -> f64 {
        0.5 * (self.r_max - self.r_min)
    }

    /// Full-envelope plasma volume [m³] at maximum elongation. Used as
    /// the reference for the design particle inventory so that fuelling
    /// does not swing with every shape change.
    pub fn vol_envelope(&self) -> f64 {
        2.0 * PI * PI * self.r_mid() * self.a_half().powi(2) * self.k_max
    }

    /// Reference elongation blend for the minor-radius shrink factor.
    pub fn k_blend(&self) -> f64 {
        0.4 * self.k_max + 0.6
    }

    /// Divertor gap threshold [m]: the boundary clearance above which
    /// the plasma counts as fully diverted.
    pub fn g_div(&self) -> f64 {
        0.05 * (self.r_mid() / 8.0).powi(2)
    }

    /// Double the confinement multiplier.
    pub fn double_confinement(mut self) -> Self {
        self.h_mult = 2.0;
        self
    }

    /// Double the Troyon coefficient.
    pub fn double_beta_limit(mut self) -> Self {
        self.troy_c = 5.0;
        self
    }

    /// Raise the elongation ceiling by 50%.
    pub fn boost_elongation(mut self) -> Self {
        self.k_max *= 1.5;
        self
    }

    /// Reject envelopes that make the geometry mapping singular.
    /// `k_max ≤ 1` collapses the elongation blend (k_max ≤ k_blend).
    pub fn validate(&self) -> TokamakResult<()> {
        if !(self.r_max > self.r_min) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "envelope r_max ({}) must exceed r_min ({})",
                self.r_max, self.r_min
            )));
        }
        if !(self.k_max > 1.0) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "envelope k_max ({}) must exceed 1",
                self.k_max
            )));
        }
        if !(self.h_mult > 0.0) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "envelope h_mult ({}) must be positive",
                self.h_mult
            )));
        }
        if !(self.troy_c > 0.0) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "envelope troy_c ({}) must be positive",
                self.troy_c
            )));
        }
        if !(self.mdot_max > 0.0) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "envelope mdot_max ({}) must be positive",
                self.mdot_max
            )));
        }
        Ok(())
    }
}

/// Linear ranges resolving operating levels into physical inputs.
/// The fuelling ceiling comes from the envelope, not from here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRanges {
    pub b_min_t: f64,
    pub b_max_t: f64,
    pub p_min_mw: f64,
    pub p_max_mw: f64,
    pub mdot_min: f64,
}

impl Default for InputRanges {
    fn default() -> Self {
        InputRanges {
            b_min_t: 1.0,
            b_max_t: 6.0,
            p_min_mw: 1.0,
            p_max_mw: 100.0,
            mdot_min: 0.005,
        }
    }
}

impl InputRanges {
    /// Resolve raw levels into physical inputs by linear interpolation.
    pub fn resolve(&self, levels: OperatingLevels, envelope: &PlantEnvelope) -> OperatingInputs {
        let span = f64::from(OPERATING_LEVEL_MAX);
        let lerp = |lo: f64, hi: f64, level: u16| lo + (hi - lo) * f64::from(level) / span;
        OperatingInputs {
            b_t: lerp(self.b_min_t, self.b_max_t, levels.field),
            p_in_mw: lerp(self.p_min_mw, self.p_max_mw, levels.power),
            mdot_fac: lerp(self.mdot_min, envelope.mdot_max, levels.fuel),
        }
    }
}

/// Nominal design-point assumptions: the target field, edge safety
/// factor and the assumed density/temperature used to anchor the
/// closed-form reference state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignAssumptions {
    /// Nominal field on axis [T]
    pub bo_t: f64,
    /// Target edge safety factor
    pub q_edge: f64,
    /// Nominal design density [10²⁰ m⁻³]
    pub n20: f64,
    /// Nominal design temperature [10 keV]
    pub t10: f64,
}

impl Default for DesignAssumptions {
    fn default() -> Self {
        DesignAssumptions {
            bo_t: 5.7,
            q_edge: 3.0,
            n20: 1.2,
            t10: 1.0,
        }
    }
}

impl DesignAssumptions {
    pub fn validate(&self) -> TokamakResult<()> {
        if !(self.q_edge > 0.0) {
            return Err(TokamakError::InvalidConfiguration(format!(
                "q_edge ({}) must be positive",
                self.q_edge
            )));
        }
        if !(self.bo_t > 0.0) || !(self.n20 > 0.0) || !(self.t10 > 0.0) {
            return Err(TokamakError::InvalidConfiguration(
                "nominal Bo, n20 and T10 must all be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Operator-editable design ceilings (popup dialog in the control
/// room): maximum field, edge safety factor, elongation ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignOverrides {
    pub bo_max_t: f64,
    pub q_edge: f64,
    pub k_max: f64,
}

/// Top-level plant configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantConfig {
    pub envelope: PlantEnvelope,
    #[serde(default)]
    pub ranges: InputRanges,
    #[serde(default)]
    pub assumptions: DesignAssumptions,
}

impl PlantConfig {
    pub fn preset(kind: EnvelopeKind) -> Self {
        PlantConfig {
            envelope: PlantEnvelope::preset(kind),
            ranges: InputRanges::default(),
            assumptions: DesignAssumptions::default(),
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> TokamakResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TokamakResult<()> {
        self.envelope.validate()?;
        self.assumptions.validate()
    }

    /// Apply operator design overrides.
    pub fn apply_overrides(&mut self, overrides: DesignOverrides) -> TokamakResult<()> {
        self.ranges.b_max_t = overrides.bo_max_t;
        self.assumptions.q_edge = overrides.q_edge;
        self.envelope.k_max = overrides.k_max;
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        PlantEnvelope::preset(EnvelopeKind::ReferenceLarge)
            .validate()
            .unwrap();
        PlantEnvelope::preset(EnvelopeKind::ReferenceCompact)
            .validate()
            .unwrap();
    }

    #[test]
    fn test_large_envelope_derived_values() {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        assert!((env.r_mid() - 8.0).abs() < 1e-12);
        assert!((env.a_half() - 3.0).abs() < 1e-12);
        assert!((env.k_blend() - 1.32).abs() < 1e-12);
        assert!((env.g_div() - 0.05).abs() < 1e-12);
        let vol = 2.0 * PI * PI * 8.0 * 9.0 * 1.8;
        assert!((env.vol_envelope() - vol).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_envelopes_rejected() {
        let mut env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        env.r_max = env.r_min;
        assert!(env.validate().is_err());

        let mut env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        env.k_max = 1.0;
        assert!(env.validate().is_err());

        let mut env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        env.h_mult = 0.0;
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_toggles() {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge)
            .double_confinement()
            .double_beta_limit()
            .boost_elongation();
        assert!((env.h_mult - 2.0).abs() < 1e-12);
        assert!((env.troy_c - 5.0).abs() < 1e-12);
        assert!((env.k_max - 2.7).abs() < 1e-12);
        env.validate().unwrap();
    }

    #[test]
    fn test_input_ranges_endpoints() {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        let ranges = InputRanges::default();

        let lo = ranges.resolve(OperatingLevels::new(0, 0, 0).unwrap(), &env);
        assert!((lo.b_t - 1.0).abs() < 1e-12);
        assert!((lo.p_in_mw - 1.0).abs() < 1e-12);
        assert!((lo.mdot_fac - 0.005).abs() < 1e-12);

        let hi = ranges.resolve(OperatingLevels::new(80, 80, 80).unwrap(), &env);
        assert!((hi.b_t - 6.0).abs() < 1e-12);
        assert!((hi.p_in_mw - 100.0).abs() < 1e-12);
        assert!((hi.mdot_fac - 0.4).abs() < 1e-12);

        let mid = ranges.resolve(OperatingLevels::new(40, 40, 40).unwrap(), &env);
        assert!((mid.b_t - 3.5).abs() < 1e-12);
        assert!((mid.p_in_mw - 50.5).abs() < 1e-12);
        assert!((mid.mdot_fac - 0.2025).abs() < 1e-12);
    }

    #[test]
    fn test_preset_shapes_are_valid_levels() {
        EnvelopeKind::ReferenceLarge
            .preset_shape()
            .validate()
            .unwrap();
        EnvelopeKind::ReferenceCompact
            .preset_shape()
            .validate()
            .unwrap();
    }

    #[test]
    fn test_config_from_file() {
        let cfg = PlantConfig::preset(EnvelopeKind::ReferenceLarge);
        let path = std::env::temp_dir().join("tokamak_plant_config_test.json");
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = PlantConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg, loaded);
        let _ = std::fs::remove_file(&path);

        assert!(PlantConfig::from_file("/nonexistent/plant.json").is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = PlantConfig::preset(EnvelopeKind::ReferenceCompact);
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: PlantConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, cfg2);
    }

    #[test]
    fn test_overrides_applied_and_validated() {
        let mut cfg = PlantConfig::preset(EnvelopeKind::ReferenceLarge);
        cfg.apply_overrides(DesignOverrides {
            bo_max_t: 8.0,
            q_edge: 2.5,
            k_max: 2.0,
        })
        .unwrap();
        assert!((cfg.ranges.b_max_t - 8.0).abs() < 1e-12);
        assert!((cfg.assumptions.q_edge - 2.5).abs() < 1e-12);
        assert!((cfg.envelope.k_max - 2.0).abs() < 1e-12);

        let err = cfg.apply_overrides(DesignOverrides {
            bo_max_t: 8.0,
            q_edge: 2.5,
            k_max: 0.9,
        });
        assert!(err.is_err());
    }
}
