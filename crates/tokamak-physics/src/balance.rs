// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Power-Balance Step
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One iteration of the lumped power/particle balance.
//!
//! The state variables are density `n20` and stored energy `W`; every
//! other observable is recomputed from them each iteration. A step first
//! advances the state with the rates carried in the previous snapshot
//! (explicit Euler, dt = 1), resetting either variable to its seed when
//! the update would collapse it below 0.1% of the seed, then evaluates
//! the full balance at the new state.
//!
//! `step` is a pure function of `(Snapshot, BalanceParams)`. The engine
//! owns sequencing and pacing; nothing here blocks or allocates.

use crate::design::{alpha_power_factor, DesignPoint, ProfileShape};
use crate::impurity::ImpurityDerived;
use tokamak_types::config::{DesignAssumptions, PlantEnvelope};
use tokamak_types::constants::{
    ALPHA_FRACTION, BETA_COEFF, BREMSSTRAHLUNG_COEFF, FUEL_MASS_COEFF, F_AUX, F_PLANT,
    GREENWALD_COEFF, RELAXATION_DT, T10_TO_MILLION_C, W_DENSITY_COEFF,
};
use tokamak_types::state::{Geometry, OperatingInputs, SimulationState, Snapshot};

/// Transport-power floor [MW] guarding the confinement power laws.
const MIN_TRANSPORT_MW: f64 = 1e-12;

/// Everything a relaxation run needs besides the two state variables.
/// Immutable for the duration of a run; a new value starts a new run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceParams {
    pub geometry: Geometry,
    pub inputs: OperatingInputs,
    pub imp: ImpurityDerived,
    /// Geometry/current coefficient: Ip [MA] = I_B · B [T]
    pub i_b: f64,
    /// Confinement multiplier from the design point
    pub h_fac: f64,
    /// Troyon coefficient for the beta-limit ratio
    pub troy_c: f64,
    /// Nominal field [T], reference for the wall-plug field cost
    pub bo_nominal_t: f64,
    /// Fuelling rate [kg/s]
    pub mdot_kg_s: f64,
    pub n20_seed: f64,
    pub w_seed_mj: f64,
    pub profile: ProfileShape,
}

impl BalanceParams {
    /// Assemble run parameters from the current geometry, design point
    /// and resolved operating inputs.
    pub fn new(
        geometry: Geometry,
        design: &DesignPoint,
        inputs: OperatingInputs,
        imp: ImpurityDerived,
        env: &PlantEnvelope,
        assumptions: &DesignAssumptions,
    ) -> Self {
        BalanceParams {
            geometry,
            inputs,
            imp,
            i_b: design.i_b,
            h_fac: design.h_fac,
            troy_c: env.troy_c,
            bo_nominal_t: assumptions.bo_t,
            mdot_kg_s: design.m_tot_kg * inputs.mdot_fac,
            n20_seed: design.n20_seed,
            w_seed_mj: design.w_seed_mj,
            profile: ProfileShape::STANDARD,
        }
    }

    /// A run can make progress only when its seeds are positive; a
    /// quiescent design point (degenerate geometry) yields none.
    pub fn is_quiescent(&self) -> bool {
        !(self.n20_seed > 0.0 && self.w_seed_mj > 0.0)
    }
}

/// All-zero snapshot for runs that cannot make progress.
pub fn quiescent_snapshot(iteration: u32) -> Snapshot {
    Snapshot {
        iteration,
        n20: 0.0,
        w_mj: 0.0,
        t10: 0.0,
        t_million_c: 0.0,
        t_log10_million_c: 0.0,
        ip_ma: 0.0,
        p_fus_mw: 0.0,
        p_alpha_mw: 0.0,
        p_neut_mw: 0.0,
        p_gain_mw: 0.0,
        p_brem_mw: 0.0,
        p_trans_mw: 0.0,
        p_loss_mw: 0.0,
        tau_89: 0.0,
        tau_98: 0.0,
        conf_t: 0.0,
        h98y2: 0.0,
        h89p: 0.0,
        dw_dt_mw: 0.0,
        dn20_dt: 0.0,
        greenwald_ratio: 0.0,
        beta_ratio: 0.0,
        beta_toroidal: 0.0,
        wall_load_mw_m2: 0.0,
        p_e_in_mw: 0.0,
        p_e_gross_mw: 0.0,
        p_e_net_mw: 0.0,
        q_gain: 0.0,
        color_index: 0,
    }
}

/// Initial snapshot of a run: the balance evaluated at the cold seeds.
pub fn seed(params: &BalanceParams) -> Snapshot {
    if params.is_quiescent() {
        return quiescent_snapshot(0);
    }
    evaluate(
        SimulationState {
            n20: params.n20_seed,
            w_mj: params.w_seed_mj,
            iteration: 0,
        },
        params,
    )
}

/// Advance one iteration from the previous snapshot.
pub fn step(prev: &Snapshot, params: &BalanceParams) -> Snapshot {
    if params.is_quiescent() {
        return quiescent_snapshot(prev.iteration + 1);
    }

    let n_new = prev.n20 + prev.dn20_dt * RELAXATION_DT;
    let n20 = if n_new <= 0.001 * params.n20_seed {
        params.n20_seed
    } else {
        n_new
    };

    let w_new = prev.w_mj + prev.dw_dt_mw * RELAXATION_DT;
    let w_mj = if w_new <= 0.001 * params.w_seed_mj {
        params.w_seed_mj
    } else {
        w_new
    };

    evaluate(
        SimulationState {
            n20,
            w_mj,
            iteration: prev.iteration + 1,
        },
        params,
    )
}

fn evaluate(state: SimulationState, p: &BalanceParams) -> Snapshot {
    let SimulationState {
        n20,
        w_mj,
        iteration,
    } = state;
    let geom = &p.geometry;
    let b = p.inputs.b_t;
    let p_in = p.inputs.p_in_mw;
    let dilution = 1.0 + p.imp.n_i_ne;

    let t10 = w_mj / (W_DENSITY_COEFF * dilution * n20 * geom.vol);
    let t_million_c = t10 * T10_TO_MILLION_C;
    let t_log10_million_c = t_million_c.log10();
    let ip_ma = b * p.i_b;

    let f_alpha = alpha_power_factor(t10, p.profile.t10_crit());
    let p_fus_mw = 0.8
        * p.profile.fusion_profile_factor()
        * p.imp.n_dt_ne.powi(2)
        * n20.powi(2)
        * f_alpha
        * geom.vol;
    let p_alpha_mw = p_fus_mw * ALPHA_FRACTION;
    let p_neut_mw = p_fus_mw - p_alpha_mw;
    let p_gain_mw = p_in + p_alpha_mw;

    let p_brem_mw = BREMSSTRAHLUNG_COEFF * n20 * n20 * p.imp.z_eff * geom.vol * t10.sqrt();
    // Radiation never drains more than half the heating power here; the
    // remainder must leave through transport.
    let p_trans_mw = (p_gain_mw - p_brem_mw)
        .max(0.5 * p_gain_mw)
        .max(MIN_TRANSPORT_MW);

    let tau_89 = 0.048
        * ip_ma.powf(0.85)
        * geom.r.powf(1.2)
        * geom.a.powf(0.3)
        * n20.powf(0.1)
        * b.powf(0.2)
        * (2.5 * geom.k / p_trans_mw).sqrt();
    let tau_98 = 0.0562
        * ip_ma.powf(0.9)
        * b.powf(0.15)
        * p_trans_mw.powf(-0.69)
        * (10.0 * n20).powf(0.41)
        * 2.5f64.powf(0.19)
        * geom.r.powf(1.97)
        * geom.aspect_ratio().powf(-0.58)
        * geom.k.powf(0.78);

    let conf_t = p.h_fac / 2.0 * tau_98;
    let h98y2 = conf_t / tau_98;
    let h89p = conf_t / tau_89;

    let p_loss_mw = w_mj / conf_t;
    let dw_dt_mw = p_gain_mw - p_loss_mw;

    let n20_in_rate = p.mdot_kg_s / (FUEL_MASS_COEFF * geom.vol);
    let n20_loss_rate = n20 / conf_t;
    let dn20_dt = n20_in_rate - n20_loss_rate;

    let greenwald_ratio = n20 / (GREENWALD_COEFF * ip_ma / geom.a.powi(2));
    let beta_ratio = n20 / (p.troy_c * ip_ma * b / (40.2 * dilution * geom.a * t10));
    let beta_toroidal = BETA_COEFF * dilution * n20 * t10 / b.powi(2);

    let wall_load_mw_m2 = p_neut_mw / geom.area;
    let p_e_in_mw = p_in * F_AUX + b / p.bo_nominal_t * 100.0;
    let p_e_gross_mw = p_neut_mw * F_PLANT;
    let p_e_net_mw = p_e_gross_mw - p_e_in_mw;

    let q_gain = if p_in <= 0.0 || ip_ma <= 0.0 {
        0.0
    } else {
        p_fus_mw / p_in
    };

    Snapshot {
        iteration,
        n20,
        w_mj,
        t10,
        t_million_c,
        t_log10_million_c,
        ip_ma,
        p_fus_mw,
        p_alpha_mw,
        p_neut_mw,
        p_gain_mw,
        p_brem_mw,
        p_trans_mw,
        p_loss_mw,
        tau_89,
        tau_98,
        conf_t,
        h98y2,
        h89p,
        dw_dt_mw,
        dn20_dt,
        greenwald_ratio,
        beta_ratio,
        beta_toroidal,
        wall_load_mw_m2,
        p_e_in_mw,
        p_e_gross_mw,
        p_e_net_mw,
        q_gain,
        color_index: color_index(p_e_net_mw),
    }
}

/// Net electric power mapped onto the 0..=20 display scale
/// (one step per 50 MW).
fn color_index(p_e_net_mw: f64) -> u8 {
    (20.0 * p_e_net_mw / 1000.0).floor().clamp(0.0, 20.0) as u8
}
