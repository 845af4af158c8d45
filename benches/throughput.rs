use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use ruleforge::{
    Amount, CompareOp, CompareParams, Compiler, ConditionKind, EffectKind, Unit, UnitBuilder,
    UnitKind,
};

fn build_batch(n: usize) -> Arc<Vec<Unit>> {
    let units = (0..n)
        .map(|i| {
            let kind = if i % 2 == 0 {
                UnitKind::Enhancement
            } else {
                UnitKind::Seal
            };
            UnitBuilder::new(kind, &format!("u{i}"))
                .description("+#1# Mult")
                .rule("r", "card_scored", |r| {
                    r.when(ConditionKind::PlayerMoney(CompareParams::new(
                        CompareOp::Gt,
                        5_i64,
                    )))
                    .effect(EffectKind::AddMult(Amount::Literal(4.0)))
                    .random(1, 3, [EffectKind::Retrigger(Amount::Literal(1.0))])
                })
                .build()
                .unwrap()
        })
        .collect();
    Arc::new(units)
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let units = build_batch(40);

        group.bench_function(&format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let units = Arc::clone(&units);
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = Compiler::default().compile_batch(&units);
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
