// ─────────────────────────────────────────────────────────────────────
// SCPN Plant Balance — Balance Step Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tokamak_physics::balance::{seed, step, BalanceParams};
use tokamak_physics::design::DesignPoint;
use tokamak_physics::geometry::map_geometry;
use tokamak_physics::impurity::ImpurityMix;
use tokamak_types::config::{DesignAssumptions, EnvelopeKind, InputRanges, PlantEnvelope};
use tokamak_types::state::{OperatingLevels, ShapeLevels};

fn reference_params() -> BalanceParams {
    let env = PlantEnvelope::preset(EnvelopeKind::ReferenceLarge);
    let assumptions = DesignAssumptions::default();
    let geom = map_geometry(ShapeLevels::centered(), &env);
    let imp = ImpurityMix::default().derived();
    let inputs =
        InputRanges::default().resolve(OperatingLevels::new(40, 40, 40).unwrap(), &env);
    let design = DesignPoint::compute(&geom, &env, &assumptions, &imp, inputs.p_in_mw);
    BalanceParams::new(geom, &design, inputs, imp, &env, &assumptions)
}

fn bench_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance");

    group.bench_function("single_step", |b| {
        let params = reference_params();
        b.iter_batched(
            || seed(&params),
            |snap| black_box(step(&snap, &params)),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("full_run_300", |b| {
        let params = reference_params();
        b.iter_batched(
            || seed(&params),
            |mut snap| {
                for _ in 0..300 {
                    snap = step(&snap, &params);
                }
                black_box(snap.q_gain)
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_balance);
criterion_main!(benches);
