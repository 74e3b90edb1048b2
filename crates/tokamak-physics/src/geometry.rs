// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Geometry Mapper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Maps the four discrete shape-control levels and the plant envelope
//! onto the plasma boundary: major/minor radius, elongation,
//! triangularity, volume and surface area.
//!
//! The level-to-factor pairing is deliberately crossed: the radial
//! factor i1 comes from the `inner` level, i2 from the `outer` level,
//! and the vertical factor i3 from the `top_outer` level, i4 from the
//! `top_inner` level. Swapping the pairing flips the sign of the
//! elongation/triangularity response; it is intentional shape coupling.

use std::f64::consts::PI;
use tokamak_types::config::PlantEnvelope;
use tokamak_types::state::{Geometry, ShapeLevels, SHAPE_LEVEL_MAX};

/// Radial-shift factor range: level 0 → 1.0, level 40 → 0.1.
const I_RADIAL_LO: f64 = 1.0;
const I_RADIAL_HI: f64 = 0.1;

/// Vertical shaping factor range: level 0 → 0.1, level 40 → 1.0.
const I_VERTICAL_LO: f64 = 0.1;
const I_VERTICAL_HI: f64 = 1.0;

/// Fraction of the envelope half-span swept by the radial shift.
const RADIAL_SHIFT_FRACTION: f64 = 0.9;

fn level_factor(lo: f64, hi: f64, level: u8) -> f64 {
    lo + (hi - lo) * f64::from(level) / f64::from(SHAPE_LEVEL_MAX)
}

/// Map shape levels and envelope into plasma boundary geometry.
///
/// Guarantees for a valid envelope: `r_min ≤ R−a`, `R+a ≤ r_max`
/// and `0 < k ≤ k_max`.
pub fn map_geometry(levels: ShapeLevels, env: &PlantEnvelope) -> Geometry {
    let i1 = level_factor(I_RADIAL_LO, I_RADIAL_HI, levels.inner);
    let i2 = level_factor(I_RADIAL_LO, I_RADIAL_HI, levels.outer);
    let i3 = level_factor(I_VERTICAL_LO, I_VERTICAL_HI, levels.top_outer);
    let i4 = level_factor(I_VERTICAL_LO, I_VERTICAL_HI, levels.top_inner);

    let r = env.r_mid() + (i2 - i1) * env.a_half() * RADIAL_SHIFT_FRACTION;
    let a_raw = (env.r_max - r).min(r - env.r_min);
    let k = 1.0 + 0.5 * (i3 + i4) * (env.k_max - 1.0);
    let d = i4 - i3;

    // Above the blend elongation, trade minor radius for height so the
    // boundary stays clear of the envelope corners.
    let f_k = (k - env.k_blend()) / (env.k_max - env.k_blend());
    let shrink = 1.0 - f_k * (0.5 - 0.25 * (i1 + i2));
    let a = if f_k < 0.0 { a_raw } else { a_raw * shrink };

    Geometry {
        r,
        a,
        k,
        d,
        vol: 2.0 * PI * PI * r * a * a * k,
        area: 4.0 * PI * PI * r * a * k.sqrt(),
    }
}
