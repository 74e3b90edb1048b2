// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Design Scanner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monte Carlo scan over the shape-level space of one plant envelope.
//!
//! Samples random boundary shapes, computes the closed-form design
//! point for each and ranks by design fusion power. The nominal design
//! assumptions often sit beyond the beta/Greenwald limits, so samples
//! are ranked rather than rejected; callers filter on the margins they
//! care about.

use crate::design::DesignPoint;
use crate::geometry::map_geometry;
use crate::impurity::ImpurityDerived;
use rand::Rng;
use tokamak_types::config::{DesignAssumptions, PlantEnvelope};
use tokamak_types::state::{Geometry, ShapeLevels, SHAPE_LEVEL_MAX};

/// One sampled shape and its design evaluation.
#[derive(Debug, Clone)]
pub struct ScanSample {
    pub levels: ShapeLevels,
    pub geometry: Geometry,
    pub design: DesignPoint,
}

impl ScanSample {
    /// Within both operational limits at the nominal design point:
    /// positive margin to the Troyon and Greenwald limits.
    pub fn within_limits(&self) -> bool {
        self.design.beta_margin > 0.0 && self.design.greenwald_margin > 0.0
    }
}

/// Scan `n_samples` random shapes, dropping degenerate geometries, and
/// return the survivors sorted by design fusion power, best first.
pub fn run_scan(
    n_samples: usize,
    env: &PlantEnvelope,
    assumptions: &DesignAssumptions,
    imp: &ImpurityDerived,
    p_in_mw: f64,
) -> Vec<ScanSample> {
    let mut rng = rand::thread_rng();
    let mut results = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let levels = ShapeLevels {
            outer: rng.gen_range(0..=SHAPE_LEVEL_MAX),
            inner: rng.gen_range(0..=SHAPE_LEVEL_MAX),
            top_inner: rng.gen_range(0..=SHAPE_LEVEL_MAX),
            top_outer: rng.gen_range(0..=SHAPE_LEVEL_MAX),
        };
        let geometry = map_geometry(levels, env);
        if geometry.is_degenerate() {
            continue;
        }
        let design = DesignPoint::compute(&geometry, env, assumptions, imp, p_in_mw);
        results.push(ScanSample {
            levels,
            geometry,
            design,
        });
    }

    results.sort_by(|x, y| {
        y.design
            .p_fus_mw
            .partial_cmp(&x.design.p_fus_mw)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impurity::ImpurityMix;
    use tokamak_types::config::EnvelopeKind;

    fn scan(n: usize) -> Vec<ScanSample> {
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        let imp = ImpurityMix::default().derived();
        run_scan(n, &env, &DesignAssumptions::default(), &imp, 50.0)
    }

    #[test]
    fn test_scan_produces_results() {
        let results = scan(500);
        assert!(!results.is_empty());
        // The mapper keeps every shape inside the envelope, so nothing
        // should be rejected as degenerate.
        assert_eq!(results.len(), 500);
    }

    #[test]
    fn test_scan_sorted_by_fusion_power() {
        let results = scan(500);
        for pair in results.windows(2) {
            assert!(pair[0].design.p_fus_mw >= pair[1].design.p_fus_mw);
        }
    }

    #[test]
    fn test_scan_values_finite() {
        for s in scan(200) {
            assert!(s.design.p_fus_mw.is_finite());
            assert!(s.design.ip_ma.is_finite() && s.design.ip_ma > 0.0);
            assert!(s.geometry.a > 0.0);
        }
    }

    #[test]
    fn test_within_limits_tracks_both_margins() {
        // At the nominal assumptions no shape of this envelope clears
        // the Troyon limit, so every sample is flagged out of limits.
        for s in scan(200) {
            assert!(!s.within_limits());
            assert!(s.design.beta_margin < 0.0);
        }

        // Relaxed density/temperature assumptions put achievable
        // operating points back inside both limits.
        let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
        let imp = ImpurityMix::default().derived();
        let assumptions = DesignAssumptions {
            n20: 0.2,
            t10: 0.5,
            ..DesignAssumptions::default()
        };
        let results = run_scan(500, &env, &assumptions, &imp, 50.0);
        assert!(results.iter().any(|s| s.within_limits()));
        for s in results.iter().filter(|s| s.within_limits()) {
            assert!(s.design.beta_margin > 0.0);
            assert!(s.design.greenwald_margin > 0.0);
        }
    }
}
