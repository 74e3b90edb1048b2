// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Design-Point Calculator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed-form reference operating point: design current, safety
//! factor, beta/density limits, stored energy, divertor margin and the
//! initial-condition seeds for the relaxation engine.
//!
//! Everything here is non-iterative. Degenerate geometry (a ≤ 0) yields
//! an all-zero quiescent design point rather than a panic or NaN.

use crate::impurity::ImpurityDerived;
use serde::Serialize;
use std::f64::consts::PI;
use tokamak_types::config::{DesignAssumptions, PlantEnvelope};
use tokamak_types::constants::{
    ALPHA_FRACTION, BETA_COEFF, GREENWALD_COEFF, IC_FACTOR, MU0_SI, M_PROTON, W_DENSITY_COEFF,
};
use tokamak_types::state::Geometry;

/// Deuterium/tritium fuel fractions of the ion inventory.
const D_FRAC: f64 = 0.5;
const T_FRAC: f64 = 0.5;

/// Fuel ion mass per unit of n20·Vol [kg per 10²⁰ m⁻³·m³].
fn fuel_mass_per_n20() -> f64 {
    M_PROTON * (2.0 * D_FRAC + 3.0 * T_FRAC) * 1e20
}

/// Density/temperature profile peaking exponents for the
/// volume-averaged fusion power and its critical temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileShape {
    pub alpha_n: f64,
    pub alpha_t: f64,
}

impl ProfileShape {
    pub const STANDARD: ProfileShape = ProfileShape {
        alpha_n: 0.5,
        alpha_t: 1.0,
    };

    /// Profile factor on the fusion power density.
    pub fn fusion_profile_factor(&self) -> f64 {
        let (an, at) = (self.alpha_n, self.alpha_t);
        (1.0 + an).powi(2) * (1.0 + 2.0 * an + 3.0 * at).powi(2)
            / (1.0 + 2.0 * an + 2.0 * at).powi(3)
    }

    /// Critical temperature [10 keV] where the reactivity power law
    /// changes branch.
    pub fn t10_crit(&self) -> f64 {
        let (an, at) = (self.alpha_n, self.alpha_t);
        ((1.0 + an) * (1.0 + 2.0 * an + 3.0 * at))
            / ((1.0 + an + at) * (1.0 + 2.0 * an + 2.0 * at))
    }
}

/// Piecewise power-law approximation of the D-T reactivity's
/// temperature dependence, normalized at the critical temperature.
pub fn alpha_power_factor(t10: f64, t10_crit: f64) -> f64 {
    let ratio = t10 / t10_crit;
    if ratio < 1.0 {
        ratio.powi(3)
    } else if ratio < 2.0 {
        ratio.powi(2)
    } else if ratio <= 3.0 {
        4.0 * (ratio / 2.0).powf(1.5)
    } else {
        4.0 * 1.5f64.powf(1.5)
    }
}

/// Closed-form reference state used to seed and scale a relaxation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesignPoint {
    /// Geometry/current coefficient: Ip [MA] = I_B · B [T]
    pub i_b: f64,
    /// Design plasma current [MA] at the nominal field
    pub ip_ma: f64,
    /// Kink safety factor at the design current
    pub q_star: f64,
    /// Troyon beta limit at the design current
    pub beta_max: f64,
    /// Greenwald density limit [10²⁰ m⁻³]
    pub n20_greenwald: f64,
    /// Margin to the Greenwald limit: 1 − n20/n20_gw
    pub greenwald_margin: f64,
    /// Design toroidal beta
    pub beta: f64,
    /// Margin to the Troyon limit: 1 − β/β_max
    pub beta_margin: f64,
    /// Design fuel inventory [kg], referenced to the envelope volume
    pub m_tot_kg: f64,
    /// Design stored energy density [MJ/m³]
    pub w_density_mj_m3: f64,
    /// Design stored energy [MJ]
    pub w_mj: f64,
    /// Design beta recomputed from stored energy (consistency check)
    pub beta_check: f64,

    // Boundary clearance
    pub g_inner: f64,
    pub g_outer: f64,
    pub g_min: f64,
    pub g_div: f64,
    /// Divertor margin fraction in [0, 1]
    pub fdiv: f64,
    /// Confinement multiplier: h_mult·(fdiv+1)
    pub h_fac: f64,
    /// Design confinement time [s] (ITER89-P at the design point)
    pub tau_design_s: f64,

    // Design fusion output at the nominal density/temperature
    pub f_alpha: f64,
    pub p_fus_mw: f64,
    pub p_alpha_mw: f64,
    pub p_neut_mw: f64,
    pub wall_load_mw_m2: f64,

    // Relaxation seeds
    pub n20_seed: f64,
    pub w_seed_mj: f64,
}

impl DesignPoint {
    /// All-zero design point for degenerate geometry.
    pub fn quiescent() -> Self {
        DesignPoint {
            i_b: 0.0,
            ip_ma: 0.0,
            q_star: 0.0,
            beta_max: 0.0,
            n20_greenwald: 0.0,
            greenwald_margin: 0.0,
            beta: 0.0,
            beta_margin: 0.0,
            m_tot_kg: 0.0,
            w_density_mj_m3: 0.0,
            w_mj: 0.0,
            beta_check: 0.0,
            g_inner: 0.0,
            g_outer: 0.0,
            g_min: 0.0,
            g_div: 0.0,
            fdiv: 0.0,
            h_fac: 0.0,
            tau_design_s: 0.0,
            f_alpha: 0.0,
            p_fus_mw: 0.0,
            p_alpha_mw: 0.0,
            p_neut_mw: 0.0,
            wall_load_mw_m2: 0.0,
            n20_seed: 0.0,
            w_seed_mj: 0.0,
        }
    }

    /// Compute the reference state from geometry, envelope, nominal
    /// assumptions, impurity dilution and the auxiliary heating power.
    pub fn compute(
        geom: &Geometry,
        env: &PlantEnvelope,
        assumptions: &DesignAssumptions,
        imp: &ImpurityDerived,
        p_in_mw: f64,
    ) -> Self {
        if geom.is_degenerate() || !(geom.r > geom.a) {
            return DesignPoint::quiescent();
        }

        let bo = assumptions.bo_t;
        let n20 = assumptions.n20;
        let t10 = assumptions.t10;

        let d_used = geom.d.max(0.0);
        let ro_a = geom.r / geom.a;
        let shaping =
            (1.0 + geom.k.powi(2) * (1.0 + 2.0 * d_used.powi(2) - 1.2 * d_used.powi(3))) / 2.0;

        let i_b = 1e-6
            * (1.17 - 0.065 / ro_a / (1.0 - 1.0 / ro_a.powi(2)).powi(2))
            * (2.0 * PI * geom.a.powi(2))
            / (MU0_SI * geom.r * assumptions.q_edge)
            * shaping;
        let ip_ma = i_b * bo;
        let q_star = 5.0 * geom.a.powi(2) * bo / (geom.r * ip_ma) * shaping;

        let beta_max = env.troy_c * ip_ma / (100.0 * geom.a * bo);
        let n20_greenwald = GREENWALD_COEFF * ip_ma / geom.a.powi(2);
        let greenwald_margin = 1.0 - n20 / n20_greenwald;
        let beta = BETA_COEFF * (1.0 + imp.n_i_ne) * n20 * t10 / bo.powi(2);
        let beta_margin = 1.0 - beta / beta_max;

        let m_tot_kg = fuel_mass_per_n20() * n20 * env.vol_envelope();
        let w_density_mj_m3 = W_DENSITY_COEFF * (1.0 + imp.n_i_ne) * n20 * t10;
        let w_mj = w_density_mj_m3 * geom.vol;
        let beta_check = w_density_mj_m3 / 1e-6 / (bo.powi(2) / (2.0 * MU0_SI)) * 2.0 / 3.0;

        let g_inner = geom.r - geom.a - env.r_min;
        let g_outer = env.r_max - (geom.r + geom.a);
        let g_min = g_inner.min(g_outer);
        let g_div = env.g_div();
        let fdiv = if g_min <= 0.0 {
            0.0
        } else if g_min >= g_div {
            1.0
        } else {
            g_min / g_div
        };
        let h_fac = env.h_mult * (fdiv + 1.0);

        let tau_design_s = if p_in_mw > 0.0 {
            h_fac
                * 0.048
                * ip_ma.powf(0.85)
                * geom.r.powf(1.2)
                * geom.a.powf(0.3)
                * n20.powf(0.1)
                * bo.powf(0.2)
                * (2.5 * geom.k / p_in_mw).sqrt()
        } else {
            0.0
        };

        let profile = ProfileShape::STANDARD;
        let f_alpha = alpha_power_factor(t10, profile.t10_crit());
        let p_fus_mw = 0.8
            * profile.fusion_profile_factor()
            * imp.n_dt_ne.powi(2)
            * n20.powi(2)
            * f_alpha
            * geom.vol;
        let p_alpha_mw = p_fus_mw * ALPHA_FRACTION;
        let p_neut_mw = p_fus_mw - p_alpha_mw;
        let wall_load_mw_m2 = p_neut_mw / geom.area;

        DesignPoint {
            i_b,
            ip_ma,
            q_star,
            beta_max,
            n20_greenwald,
            greenwald_margin,
            beta,
            beta_margin,
            m_tot_kg,
            w_density_mj_m3,
            w_mj,
            beta_check,
            g_inner,
            g_outer,
            g_min,
            g_div,
            fdiv,
            h_fac,
            tau_design_s,
            f_alpha,
            p_fus_mw,
            p_alpha_mw,
            p_neut_mw,
            wall_load_mw_m2,
            n20_seed: n20 * IC_FACTOR,
            w_seed_mj: w_mj * IC_FACTOR * IC_FACTOR,
        }
    }
}
