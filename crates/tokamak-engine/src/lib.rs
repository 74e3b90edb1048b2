// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Tokamak Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Paced background relaxation runs over the plant power balance.
//!
//! A single long-lived worker thread owns the simulation state. The
//! foreground hands it immutable run parameters over a channel; every
//! message begins a fresh run, and a message arriving mid-run restarts
//! it at the next iteration boundary. Observables come back as
//! whole-snapshot copies, so readers never see a half-updated state.

pub mod engine;

pub use engine::{ConvergencePolicy, EngineConfig, PlantSimulator};
