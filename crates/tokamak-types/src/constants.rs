// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Vacuum permeability (H/m)
pub const MU0_SI: f64 = 4.0e-7 * std::f64::consts::PI;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.6726e-27;

/// Alpha particle energy fraction of the D-T yield (3.5/17.6 MeV)
pub const ALPHA_FRACTION: f64 = 3.5 / 17.6;

/// Stored energy density coefficient: W [MJ/m³] = 0.2403·(1+nI/ne)·n20·T10
pub const W_DENSITY_COEFF: f64 = 0.2403;

/// Bremsstrahlung coefficient: P [MW] = 0.0168·n20²·Zeff·Vol·√T10
pub const BREMSSTRAHLUNG_COEFF: f64 = 0.0168;

/// Fuel mass per unit of n20·Vol for a 50/50 D-T plasma (kg per 10²⁰ m⁻³·m³)
pub const FUEL_MASS_COEFF: f64 = 4.18e-7;

/// Greenwald density limit coefficient: n20_gw = 0.27·Ip/a²
pub const GREENWALD_COEFF: f64 = 0.27;

/// Toroidal beta coefficient: β = 0.402·(1+nI/ne)·n20·T10/B²
pub const BETA_COEFF: f64 = 0.402;

/// Wall-plug multiplier on auxiliary heating power
pub const F_AUX: f64 = 3.0;

/// Thermal-to-electric plant conversion efficiency
pub const F_PLANT: f64 = 0.4;

/// Initial-condition scale factor applied to the design density
/// (and squared to the design stored energy) when seeding a run.
pub const IC_FACTOR: f64 = 0.01;

/// Conversion from T10 (10 keV units) to millions of degrees Celsius.
pub const T10_TO_MILLION_C: f64 = 116.05;

/// Relaxation pseudo-time step (dimensionless).
pub const RELAXATION_DT: f64 = 1.0;
