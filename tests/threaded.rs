use std::sync::Arc;
use std::thread;

use ruleforge::{
    compile_unit, Amount, ArtifactSet, CompareOp, CompareParams, Compiler, ConditionKind,
    EffectKind, Unit, UnitBuilder, UnitKind,
};

fn unit(key: &str, threshold: i64) -> Unit {
    UnitBuilder::new(UnitKind::Enhancement, key)
        .description("+#1# Mult")
        .rule("r", "card_scored", |r| {
            r.when(ConditionKind::PlayerMoney(CompareParams::new(
                CompareOp::Gte,
                threshold,
            )))
            .effect(EffectKind::AddMult(Amount::Literal(4.0)))
        })
        .build()
        .unwrap()
}

#[test]
fn independent_units_compile_in_parallel() {
    let units: Vec<Unit> = (0..8).map(|i| unit(&format!("u{i}"), i * 5)).collect();
    let sequential: Vec<String> = units.iter().map(|u| compile_unit(u).source).collect();

    let handles: Vec<_> = units
        .into_iter()
        .map(|u| thread::spawn(move || compile_unit(&u).source))
        .collect();
    let parallel: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn artifacts_are_shared_across_threads() {
    let units: Vec<Unit> = (0..4).map(|i| unit(&format!("u{i}"), i)).collect();
    let set: Arc<ArtifactSet> = Arc::new(Compiler::default().compile_batch(&units).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let path = format!("enhancements/u{i}.lua");
                set.get(&path).map(|s| s.contains("G.GAME.dollars >= "))
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(true));
    }
}

#[test]
fn compiler_moves_between_threads() {
    let mut compiler = Compiler::default();
    compiler.compile_unit(&unit("first", 1));

    let handle = thread::spawn(move || {
        let artifact = compiler.compile_unit(&unit("second", 2));
        (artifact.position, compiler.next_position())
    });
    let (position, next) = handle.join().unwrap();
    assert_eq!((position.x, position.y), (1, 0));
    assert_eq!(next, 2);
}

#[test]
fn output_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Unit>();
    assert_send_sync::<Compiler>();
    assert_send_sync::<ArtifactSet>();
}
