// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{TokamakError, TokamakResult};
use serde::{Deserialize, Serialize};

/// Discrete shape-control levels for the four boundary actuators.
/// Each level is an integer in [0, 40].
///
/// Naming follows the control-room sliders: `outer`/`inner` drive the
/// radial shift of the boundary, `top_inner`/`top_outer` drive the
/// vertical (elongation/triangularity) shaping. Note that the mapping
/// onto physical shape factors is deliberately cross-paired; see
/// the geometry mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeLevels {
    pub outer: u8,
    pub inner: u8,
    pub top_inner: u8,
    pub top_outer: u8,
}

pub const SHAPE_LEVEL_MAX: u8 = 40;

impl ShapeLevels {
    pub fn new(outer: u8, inner: u8, top_inner: u8, top_outer: u8) -> TokamakResult<Self> {
        let levels = ShapeLevels {
            outer,
            inner,
            top_inner,
            top_outer,
        };
        levels.validate()?;
        Ok(levels)
    }

    pub fn validate(&self) -> TokamakResult<()> {
        for (name, v) in [
            ("outer", self.outer),
            ("inner", self.inner),
            ("top_inner", self.top_inner),
            ("top_outer", self.top_outer),
        ] {
            if v > SHAPE_LEVEL_MAX {
                return Err(TokamakError::InvalidConfiguration(format!(
                    "shape level `{name}` = {v} exceeds {SHAPE_LEVEL_MAX}"
                )));
            }
        }
        Ok(())
    }

    /// Centered shape: mid-range radial shift, no vertical shaping.
    pub fn centered() -> Self {
        ShapeLevels {
            outer: 40,
            inner: 40,
            top_inner: 0,
            top_outer: 0,
        }
    }
}

impl Default for ShapeLevels {
    fn default() -> Self {
        ShapeLevels::centered()
    }
}

/// Continuous operating-point levels for field, heating power and
/// fuelling rate. Each level is an integer in [0, 80], resolved to
/// physical quantities by the configured `InputRanges`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingLevels {
    pub field: u16,
    pub power: u16,
    pub fuel: u16,
}

pub const OPERATING_LEVEL_MAX: u16 = 80;

impl OperatingLevels {
    pub fn new(field: u16, power: u16, fuel: u16) -> TokamakResult<Self> {
        let levels = OperatingLevels { field, power, fuel };
        levels.validate()?;
        Ok(levels)
    }

    pub fn validate(&self) -> TokamakResult<()> {
        for (name, v) in [
            ("field", self.field),
            ("power", self.power),
            ("fuel", self.fuel),
        ] {
            if v > OPERATING_LEVEL_MAX {
                return Err(TokamakError::InvalidConfiguration(format!(
                    "operating level `{name}` = {v} exceeds {OPERATING_LEVEL_MAX}"
                )));
            }
        }
        Ok(())
    }
}

/// Physical operating inputs, constant for the duration of one
/// relaxation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingInputs {
    /// Toroidal field on axis [T]
    pub b_t: f64,
    /// Auxiliary heating power [MW]
    pub p_in_mw: f64,
    /// Fuelling-rate factor (fraction of the design particle inventory
    /// injected per pseudo-second)
    pub mdot_fac: f64,
}

/// Plasma boundary geometry, a pure function of shape levels and
/// envelope. Immutable input to all downstream computation until the
/// next shape or envelope change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Major radius [m]
    pub r: f64,
    /// Minor radius [m]
    pub a: f64,
    /// Elongation
    pub k: f64,
    /// Triangularity
    pub d: f64,
    /// Plasma volume [m³]: 2π²·R·a²·k
    pub vol: f64,
    /// Plasma surface area [m²]: 4π²·R·a·√k
    pub area: f64,
}

impl Geometry {
    pub fn aspect_ratio(&self) -> f64 {
        self.r / self.a
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.a > 0.0)
    }
}

/// The two state variables advanced by the relaxation engine, plus the
/// iteration counter. Created fresh at the start of every run and
/// mutated only by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Volume-averaged electron density [10²⁰ m⁻³]
    pub n20: f64,
    /// Stored thermal energy [MJ]
    pub w_mj: f64,
    /// Completed iterations within this run
    pub iteration: u32,
}

/// Read-only observables published after each relaxation iteration.
/// Published by copy; safe to read from any thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub iteration: u32,

    // State variables
    pub n20: f64,
    pub w_mj: f64,

    // Temperature
    /// Volume-averaged temperature [10 keV]
    pub t10: f64,
    pub t_million_c: f64,
    /// log10 of `t_million_c`, for logarithmic temperature displays
    pub t_log10_million_c: f64,

    // Current and powers
    pub ip_ma: f64,
    pub p_fus_mw: f64,
    pub p_alpha_mw: f64,
    pub p_neut_mw: f64,
    pub p_gain_mw: f64,
    pub p_brem_mw: f64,
    pub p_trans_mw: f64,
    pub p_loss_mw: f64,

    // Confinement
    pub tau_89: f64,
    pub tau_98: f64,
    pub conf_t: f64,
    pub h98y2: f64,
    pub h89p: f64,

    // Rates applied at the next iteration
    pub dw_dt_mw: f64,
    pub dn20_dt: f64,

    // Limit ratios and derived reporting values
    pub greenwald_ratio: f64,
    pub beta_ratio: f64,
    pub beta_toroidal: f64,
    pub wall_load_mw_m2: f64,

    // Plant electric balance
    pub p_e_in_mw: f64,
    pub p_e_gross_mw: f64,
    pub p_e_net_mw: f64,
    /// Q = Pfus/Paux, zero when either Ip or Paux is non-positive
    pub q_gain: f64,
    /// Display hint: net electric power scaled to 0..=20
    pub color_index: u8,
}

/// Relaxation engine run states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
    Exhausted,
}

/// How the most recent run ended. The fixed-budget default never
/// reports `Converged`; a convergence policy may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    BudgetExhausted,
    Converged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_levels_validation() {
        assert!(ShapeLevels::new(0, 0, 0, 0).is_ok());
        assert!(ShapeLevels::new(40, 40, 40, 40).is_ok());
        assert!(ShapeLevels::new(41, 0, 0, 0).is_err());
        assert!(ShapeLevels::new(0, 0, 0, 41).is_err());
    }

    #[test]
    fn test_operating_levels_validation() {
        assert!(OperatingLevels::new(0, 0, 0).is_ok());
        assert!(OperatingLevels::new(80, 80, 80).is_ok());
        assert!(OperatingLevels::new(81, 0, 0).is_err());
    }

    #[test]
    fn test_degenerate_geometry_detection() {
        let geom = Geometry {
            r: 8.0,
            a: 0.0,
            k: 1.0,
            d: 0.0,
            vol: 0.0,
            area: 0.0,
        };
        assert!(geom.is_degenerate());
        let geom = Geometry { a: -1.0, ..geom };
        assert!(geom.is_degenerate());
        let geom = Geometry { a: f64::NAN, ..geom };
        assert!(geom.is_degenerate());
    }
}
