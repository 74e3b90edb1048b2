// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Physics Property Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based invariants over the whole shape/operating space.

use proptest::prelude::*;
use tokamak_physics::balance::{seed, step, BalanceParams};
use tokamak_physics::design::DesignPoint;
use tokamak_physics::geometry::map_geometry;
use tokamak_physics::impurity::ImpurityMix;
use tokamak_types::config::{DesignAssumptions, EnvelopeKind, InputRanges, PlantEnvelope};
use tokamak_types::state::{OperatingLevels, ShapeLevels};

fn any_shape() -> impl Strategy<Value = ShapeLevels> {
    (0u8..=40, 0u8..=40, 0u8..=40, 0u8..=40).prop_map(|(outer, inner, top_inner, top_outer)| {
        ShapeLevels {
            outer,
            inner,
            top_inner,
            top_outer,
        }
    })
}

fn any_envelope() -> impl Strategy<Value = PlantEnvelope> {
    prop_oneof![
        Just(PlantEnvelope::preset(EnvelopeKind::ReferenceLarge)),
        Just(PlantEnvelope::preset(EnvelopeKind::ReferenceCompact)),
        Just(PlantEnvelope::preset(EnvelopeKind::ReferenceLarge).boost_elongation()),
    ]
}

proptest! {
    /// Every shape in every envelope stays inside the radial build and
    /// below the elongation ceiling.
    #[test]
    fn prop_geometry_within_envelope(levels in any_shape(), env in any_envelope()) {
        let geom = map_geometry(levels, &env);
        prop_assert!(geom.a > 0.0);
        prop_assert!(geom.r - geom.a >= env.r_min - 1e-9);
        prop_assert!(geom.r + geom.a <= env.r_max + 1e-9);
        prop_assert!(geom.k > 1.0 - 1e-12 && geom.k <= env.k_max + 1e-12);
        prop_assert!(geom.d.abs() <= 0.9 + 1e-12);
        prop_assert!(geom.vol > 0.0 && geom.area > 0.0);
    }

    /// Zeff is at least 1 and the ion bookkeeping closes for any
    /// physically sensible impurity mix.
    #[test]
    fn prop_impurity_bookkeeping(
        he in 0.0..0.12f64,
        be in 0.0..0.03f64,
        c in 0.0..0.02f64,
        o in 0.0..0.005f64,
        ar in 0.0..0.003f64,
        fe in 0.0..0.0005f64,
    ) {
        let mix = ImpurityMix { he, be, c, o, ar, fe };
        mix.validate().unwrap();
        let derived = mix.derived();
        prop_assert!(derived.z_eff >= 1.0);
        let impurity_sum = he + be + c + o + ar + fe;
        prop_assert!((derived.n_i_ne - (impurity_sum + derived.n_dt_ne)).abs() < 1e-12);
        prop_assert!(derived.n_dt_ne <= 1.0);
    }

    /// The design point is finite for every shape, and its seeds are
    /// positive wherever the geometry is non-degenerate.
    #[test]
    fn prop_design_point_finite(levels in any_shape(), env in any_envelope()) {
        let geom = map_geometry(levels, &env);
        let imp = ImpurityMix::default().derived();
        let design = DesignPoint::compute(&geom, &env, &DesignAssumptions::default(), &imp, 50.0);
        prop_assert!(design.ip_ma.is_finite() && design.ip_ma > 0.0);
        prop_assert!(design.q_star.is_finite() && design.q_star > 0.0);
        prop_assert!(design.w_mj.is_finite() && design.w_mj > 0.0);
        prop_assert!(design.n20_seed > 0.0 && design.w_seed_mj > 0.0);
        prop_assert!(design.fdiv >= 0.0 && design.fdiv <= 1.0);
        prop_assert!(design.h_fac >= env.h_mult);
    }

    /// Fifty balance iterations from cold seeds never produce NaN or a
    /// non-positive state, for any shape and operating point.
    #[test]
    fn prop_balance_run_stays_finite(
        levels in any_shape(),
        field in 0u16..=80,
        power in 0u16..=80,
        fuel in 0u16..=80,
    ) {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        let assumptions = DesignAssumptions::default();
        let geom = map_geometry(levels, &env);
        let imp = ImpurityMix::default().derived();
        let inputs = InputRanges::default()
            .resolve(OperatingLevels { field, power, fuel }, &env);
        let design = DesignPoint::compute(&geom, &env, &assumptions, &imp, inputs.p_in_mw);
        let params = BalanceParams::new(geom, &design, inputs, imp, &env, &assumptions);

        let mut snap = seed(&params);
        for _ in 0..50 {
            snap = step(&snap, &params);
            prop_assert!(snap.n20.is_finite() && snap.n20 > 0.0);
            prop_assert!(snap.w_mj.is_finite() && snap.w_mj > 0.0);
            prop_assert!(snap.t10.is_finite() && snap.t10 > 0.0);
            prop_assert!(snap.conf_t.is_finite() && snap.conf_t > 0.0);
            prop_assert!(snap.q_gain.is_finite() && snap.q_gain >= 0.0);
            prop_assert!(snap.color_index <= 20);
        }
        prop_assert_eq!(snap.iteration, 50);
    }

    /// The iteration counter is driven by stepping alone.
    #[test]
    fn prop_iteration_monotonic(levels in any_shape(), n in 1u32..40) {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        let assumptions = DesignAssumptions::default();
        let geom = map_geometry(levels, &env);
        let imp = ImpurityMix::default().derived();
        let inputs = InputRanges::default()
            .resolve(OperatingLevels::default(), &env);
        let design = DesignPoint::compute(&geom, &env, &assumptions, &imp, inputs.p_in_mw);
        let params = BalanceParams::new(geom, &design, inputs, imp, &env, &assumptions);

        let mut snap = seed(&params);
        for expected in 1..=n {
            snap = step(&snap, &params);
            prop_assert_eq!(snap.iteration, expected);
        }
    }
}
