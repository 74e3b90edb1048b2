// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Impurity/Charge Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Effective ion charge and D-T fuel dilution from the impurity mix.
//!
//! All quantities are ion-density fractions relative to the electron
//! density. The model is a pure function of the mix: callers recompute
//! the derived values whenever any fraction changes.

use serde::{Deserialize, Serialize};
use tokamak_types::error::{TokamakError, TokamakResult};

/// Ionic charges of the tracked species.
const Z_HE: f64 = 2.0;
const Z_BE: f64 = 4.0;
const Z_C: f64 = 6.0;
const Z_O: f64 = 8.0;
const Z_AR: f64 = 18.0;
const Z_FE: f64 = 26.0;

/// Impurity composition: ion-density fractions of the electron density.
/// Invariant: every fraction is non-negative. Over-specified mixes that
/// drive the D-T fraction negative are representable and flagged, not
/// corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpurityMix {
    /// Helium ash
    pub he: f64,
    pub be: f64,
    pub c: f64,
    pub o: f64,
    pub ar: f64,
    pub fe: f64,
}

/// Quantities derived from an `ImpurityMix`, consumed by the design
/// point and the relaxation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpurityDerived {
    /// D-T fuel ion fraction of n_e; negative when the mix is
    /// over-specified.
    pub n_dt_ne: f64,
    /// Total ion fraction of n_e, D-T included.
    pub n_i_ne: f64,
    /// Charge-weighted effective ion charge, ≥ 1 for valid mixes.
    pub z_eff: f64,
}

impl ImpurityDerived {
    pub fn is_overspecified(&self) -> bool {
        self.n_dt_ne < 0.0
    }
}

impl ImpurityMix {
    /// A pure D-T plasma with no impurities.
    pub fn clean() -> Self {
        ImpurityMix {
            he: 0.0,
            be: 0.0,
            c: 0.0,
            o: 0.0,
            ar: 0.0,
            fe: 0.0,
        }
    }

    /// Reference He/C/O/Fe mix scaled from the nominal design density.
    /// Carbon and iron follow empirical density correlations and are
    /// rounded to four significant digits.
    pub fn reference_for_density(n20: f64) -> Self {
        ImpurityMix {
            he: 0.1,
            be: 0.0,
            c: round_sig4(0.009 + 0.006 * (0.7 / n20).powf(2.6)),
            o: 0.001,
            ar: 0.0,
            fe: round_sig4(0.0005 * (0.7 / n20).powf(2.3)),
        }
    }

    /// Alternate low-Z wall mix: beryllium plus argon seeding.
    pub fn beryllium_argon() -> Self {
        ImpurityMix {
            he: 0.0,
            be: 0.02,
            c: 0.0,
            o: 0.0,
            ar: 0.0016,
            fe: 0.0,
        }
    }

    pub fn validate(&self) -> TokamakResult<()> {
        for (name, v) in [
            ("He", self.he),
            ("Be", self.be),
            ("C", self.c),
            ("O", self.o),
            ("Ar", self.ar),
            ("Fe", self.fe),
        ] {
            if !(v >= 0.0) {
                return Err(TokamakError::InvalidConfiguration(format!(
                    "impurity fraction {name} = {v} must be non-negative"
                )));
            }
        }
        Ok(())
    }

    /// Renormalize an edited mix: carbon and iron are carried at four
    /// significant digits, matching the precision of the reference
    /// correlations. Other species are kept as entered.
    pub fn rounded(self) -> Self {
        ImpurityMix {
            c: round_sig4(self.c),
            fe: round_sig4(self.fe),
            ..self
        }
    }

    /// Compute the dilution, total ion fraction and Zeff.
    pub fn derived(&self) -> ImpurityDerived {
        let n_dt_ne = 1.0
            - Z_HE * self.he
            - Z_BE * self.be
            - Z_C * self.c
            - Z_O * self.o
            - Z_AR * self.ar
            - Z_FE * self.fe;
        let n_i_ne = self.he + self.be + self.c + self.o + self.ar + self.fe + n_dt_ne;
        let z_eff = 1.0
            + Z_HE * (Z_HE - 1.0) * self.he
            + Z_BE * (Z_BE - 1.0) * self.be
            + Z_C * (Z_C - 1.0) * self.c
            + Z_O * (Z_O - 1.0) * self.o
            + Z_AR * (Z_AR - 1.0) * self.ar
            + Z_FE * (Z_FE - 1.0) * self.fe;
        ImpurityDerived {
            n_dt_ne,
            n_i_ne,
            z_eff,
        }
    }
}

impl Default for ImpurityMix {
    fn default() -> Self {
        ImpurityMix::reference_for_density(1.2)
    }
}

/// Round to four significant digits (half away from zero).
fn round_sig4(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let scale = 10f64.powf(x.abs().log10().floor() + 1.0 - 4.0);
    (x / scale).round() * scale
}
