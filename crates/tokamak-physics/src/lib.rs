// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Tokamak Physics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Zero-dimensional plant physics: impurity/charge model, boundary
//! geometry mapper, closed-form design point, power-balance relaxation
//! step and the Monte Carlo design-space scanner.

pub mod balance;
pub mod design;
pub mod geometry;
pub mod impurity;
pub mod scan;
