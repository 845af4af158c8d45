use tracing::debug;

use crate::types::{EffectKind, TriggerId};

/// The guard a trigger wraps its rules in, and a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerInfo {
    /// `None` means the rule body runs unguarded.
    pub guard: Option<&'static str>,
    pub label: &'static str,
}

/// Map a trigger to its runtime guard expression.
///
/// Unknown triggers have no guard, so their rules always fire.
#[must_use]
pub fn resolve_trigger(trigger: &TriggerId) -> TriggerInfo {
    match trigger {
        TriggerId::CardScored => TriggerInfo {
            guard: Some("context.main_scoring and context.cardarea == G.play"),
            label: "When this card is scored",
        },
        TriggerId::CardHeld => TriggerInfo {
            guard: Some("context.main_scoring and context.cardarea == G.hand"),
            label: "When this card is held in hand",
        },
        TriggerId::CardHeldEndOfRound => TriggerInfo {
            guard: Some(
                "context.end_of_round and context.cardarea == G.hand and context.other_card == card and context.individual",
            ),
            label: "When this card is held in hand at end of round",
        },
        TriggerId::CardDiscarded => TriggerInfo {
            guard: Some("context.discard and context.other_card == card"),
            label: "When this card is discarded",
        },
        TriggerId::Unknown(id) => {
            debug!(trigger = %id, "unknown trigger; rule runs unguarded");
            TriggerInfo {
                guard: None,
                label: "Unknown trigger",
            }
        }
    }
}

/// How repeated contributions to one static field combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldKind {
    Additive,
    Multiplicative,
}

impl FoldKind {
    #[must_use]
    pub fn combine(self, acc: f64, value: f64) -> f64 {
        match self {
            FoldKind::Additive => acc + value,
            FoldKind::Multiplicative => acc * value,
        }
    }
}

/// A field of an enhancement's static config that the runtime applies on
/// its own for a given trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticField {
    pub name: &'static str,
    pub fold: FoldKind,
}

const fn additive(name: &'static str) -> Option<StaticField> {
    Some(StaticField {
        name,
        fold: FoldKind::Additive,
    })
}

const fn multiplicative(name: &'static str) -> Option<StaticField> {
    Some(StaticField {
        name,
        fold: FoldKind::Multiplicative,
    })
}

/// The static field that replaces `effect` under `trigger`, if any.
#[must_use]
pub fn static_field(trigger: &TriggerId, effect: &EffectKind) -> Option<StaticField> {
    match (trigger, effect) {
        (TriggerId::CardScored, EffectKind::AddChips(_)) => additive("bonus"),
        (TriggerId::CardScored, EffectKind::AddMult(_)) => additive("mult"),
        (TriggerId::CardScored, EffectKind::ApplyXMult(_)) => multiplicative("x_mult"),
        (TriggerId::CardScored, EffectKind::ApplyXChips(_)) => multiplicative("x_chips"),
        (TriggerId::CardScored, EffectKind::AddDollars(_)) => additive("p_dollars"),
        (TriggerId::CardHeld, EffectKind::AddChips(_)) => additive("h_chips"),
        (TriggerId::CardHeld, EffectKind::AddMult(_)) => additive("h_mult"),
        (TriggerId::CardHeld, EffectKind::ApplyXMult(_)) => multiplicative("h_x_mult"),
        (TriggerId::CardHeld, EffectKind::ApplyXChips(_)) => multiplicative("h_x_chips"),
        (TriggerId::CardHeldEndOfRound, EffectKind::AddDollars(_)) => additive("h_dollars"),
        _ => None,
    }
}
