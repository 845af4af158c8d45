#![cfg(feature = "binary-cache")]

use ruleforge::{
    load_units, Amount, ArtifactSet, CompareOp, CompareParams, Compiler, CompileOptions,
    ConditionKind, DeserializeError, EffectKind, Unit, UnitBuilder, UnitKind,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SOURCE: &str = r#"[
    {"kind": "enhancement", "key": "glassy", "description": "+#1# Chips",
     "rules": [{"trigger": "card_scored",
                "effects": [{"type": "add_chips", "params": {"value": 30}}]}]},
    {"kind": "seal", "key": "ruby",
     "rules": [{"trigger": "card_held",
                "effects": [{"type": "add_mult", "params": {"value": 4}}]}]}
]"#;

fn units() -> Vec<Unit> {
    vec![
        UnitBuilder::new(UnitKind::Enhancement, "glassy")
            .description("+#1# Chips")
            .rule("r1", "card_scored", |r| {
                r.effect(EffectKind::AddChips(Amount::Literal(30.0)))
            })
            .build()
            .unwrap(),
        UnitBuilder::new(UnitKind::Seal, "ruby")
            .rule("r1", "card_held", |r| {
                r.when(ConditionKind::PlayerMoney(CompareParams::new(CompareOp::Gt, 10_i64)))
                    .effect(EffectKind::AddMult(Amount::Literal(4.0)))
            })
            .build()
            .unwrap(),
    ]
}

fn artifacts() -> ArtifactSet {
    Compiler::new(CompileOptions::default().emit_loader(true))
        .compile_batch(&units())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Round-trips
// ---------------------------------------------------------------------------

#[test]
fn round_trip() {
    let original = artifacts();
    let bytes = original.to_bytes(None).unwrap();
    let restored = ArtifactSet::from_bytes(&bytes).unwrap();
    assert_eq!(original, restored);
    assert_eq!(restored.len(), 3);
}

#[test]
fn round_trip_from_loaded_json() {
    let units = load_units(SOURCE).unwrap();
    let original = Compiler::default().compile_batch(&units).unwrap();
    let bytes = original.to_bytes(Some(SOURCE)).unwrap();
    assert_eq!(ArtifactSet::from_bytes(&bytes).unwrap(), original);
}

#[test]
fn empty_set_round_trip() {
    let bytes = ArtifactSet::new().to_bytes(None).unwrap();
    assert!(ArtifactSet::from_bytes(&bytes).unwrap().is_empty());
}

#[test]
fn encoding_determinism() {
    let a = artifacts().to_bytes(Some(SOURCE)).unwrap();
    let b = artifacts().to_bytes(Some(SOURCE)).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

#[test]
fn fresh_for_same_source() {
    let bytes = artifacts().to_bytes(Some(SOURCE)).unwrap();
    assert!(ArtifactSet::is_fresh_for(&bytes, SOURCE).unwrap());
}

#[test]
fn stale_after_source_edit() {
    let bytes = artifacts().to_bytes(Some(SOURCE)).unwrap();
    let edited = SOURCE.replace("30", "40");
    assert!(!ArtifactSet::is_fresh_for(&bytes, &edited).unwrap());
}

#[test]
fn never_fresh_without_digest() {
    let bytes = artifacts().to_bytes(None).unwrap();
    assert!(!ArtifactSet::is_fresh_for(&bytes, SOURCE).unwrap());
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn corruption_byte_flip() {
    let mut bytes = artifacts().to_bytes(None).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = ArtifactSet::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::ChecksumMismatch),
        "expected ChecksumMismatch, got: {err}"
    );
}

#[test]
fn corruption_truncation() {
    let bytes = artifacts().to_bytes(None).unwrap();
    let err = ArtifactSet::from_bytes(&bytes[..33]).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { .. }),
        "expected LengthMismatch, got: {err}"
    );
}

#[test]
fn bad_magic() {
    let mut bytes = artifacts().to_bytes(None).unwrap();
    bytes[0..4].copy_from_slice(b"BAAD");
    let err = ArtifactSet::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::BadMagic),
        "expected BadMagic, got: {err}"
    );
}

#[test]
fn version_mismatch() {
    let mut bytes = artifacts().to_bytes(None).unwrap();
    bytes[4] = 99;
    bytes[5] = 0;
    let err = ArtifactSet::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            DeserializeError::IncompatibleVersion {
                blob: 99,
                supported: 1
            }
        ),
        "expected IncompatibleVersion, got: {err}"
    );
}

#[test]
fn empty_input_rejected() {
    assert!(matches!(
        ArtifactSet::from_bytes(&[]),
        Err(DeserializeError::LengthMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_round_trip() {
    let dir = std::env::temp_dir().join(format!("ruleforge_cache_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("artifacts.rfge");

    let original = artifacts();
    original.to_cache_file(&path, Some(SOURCE)).unwrap();
    let restored = ArtifactSet::from_cache_file(&path).unwrap();
    assert_eq!(original, restored);

    let _ = std::fs::remove_dir_all(&dir);
}
