use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruleforge::{
    compile_unit, load_units, Amount, CompareOp, CompareParams, ConditionKind, EffectKind, Unit,
    UnitBuilder, UnitKind,
};

/// A unit with `n` conditional rules, each carrying a random group.
fn build_unit(n: usize) -> Unit {
    let mut builder = UnitBuilder::new(UnitKind::Enhancement, "bench")
        .description("+#1# Mult, #2# in #3# chance");
    for i in 0..n {
        let threshold = i64::try_from(i).unwrap_or(0);
        builder = builder.rule(&format!("r{i}"), "card_scored", move |r| {
            r.group(|g| {
                g.when(ConditionKind::PlayerMoney(CompareParams::new(
                    CompareOp::Gte,
                    threshold,
                )))
                .or(ConditionKind::FirstHand)
            })
            .effect(EffectKind::AddMult(Amount::Literal(4.0)))
            .effect(EffectKind::AddChips(Amount::game_var(ruleforge::GameVar::Money)))
            .random(1, 4, [EffectKind::AddDollars(Amount::Literal(3.0))])
        });
    }
    builder.build().unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_unit");

    for &n in &[1, 10, 50] {
        let unit = build_unit(n);
        group.bench_function(&format!("{n}_rules"), |b| {
            b.iter(|| compile_unit(black_box(&unit)));
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let one = r#"{"kind": "seal", "key": "KEY", "description": "+#1# Chips",
        "rules": [{"trigger": "card_held",
                   "conditionGroups": [{"conditions": [{"type": "player_money", "params": {"operator": "greater_than", "value": 10}}]}],
                   "effects": [{"type": "add_chips", "params": {"value": 25}}]}]}"#;
    let json = format!(
        "[{}]",
        (0..50)
            .map(|i| one.replace("KEY", &format!("s{i}")))
            .collect::<Vec<_>>()
            .join(",")
    );

    c.bench_function("load_units/50", |b| {
        b.iter(|| load_units(black_box(&json)));
    });
}

criterion_group!(benches, bench_compile, bench_load);
criterion_main!(benches);
