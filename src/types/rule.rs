use super::condition::ConditionKind;
use super::effect::EffectKind;
use super::expr::LogicOp;
use super::trigger::TriggerId;

/// A single When → If → Then rule owned by a [`Unit`](super::Unit).
///
/// A rule with no contributing condition groups fires every time its trigger
/// does.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub trigger: TriggerId,
    pub condition_groups: Vec<ConditionGroup>,
    pub effects: Vec<Effect>,
    pub random_groups: Vec<RandomGroup>,
}

impl Rule {
    /// True if any effect, plain or random, destroys the card.
    #[must_use]
    pub fn destroys(&self) -> bool {
        self.all_effects()
            .any(|e| matches!(e.kind, EffectKind::DestroyCard))
    }

    /// True if any effect, plain or random, retriggers the card.
    #[must_use]
    pub fn retriggers(&self) -> bool {
        self.all_effects()
            .any(|e| matches!(e.kind, EffectKind::Retrigger(_)))
    }

    /// Plain effects followed by the effects of each random group.
    pub fn all_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .chain(self.random_groups.iter().flat_map(|g| g.effects.iter()))
    }
}

/// Conditions joined by a left fold; groups themselves are always joined by AND.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    pub id: String,
    /// Stored for the editor; has no effect on compilation.
    pub operator: LogicOp,
    pub conditions: Vec<Condition>,
}

/// One boolean test.
///
/// `operator` joins this condition to the *next* contributing condition in
/// its group: for `c1(or), c2(and), c3` the group reads `(c1 or c2) and c3`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: String,
    pub kind: ConditionKind,
    pub negate: bool,
    pub operator: LogicOp,
}

impl Condition {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ConditionKind) -> Self {
        Self {
            id: id.into(),
            kind,
            negate: false,
            operator: LogicOp::And,
        }
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    #[must_use]
    pub fn then(mut self, operator: LogicOp) -> Self {
        self.operator = operator;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub id: String,
    pub kind: EffectKind,
    pub custom_message: Option<String>,
}

impl Effect {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            kind,
            custom_message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.custom_message = (!message.is_empty()).then_some(message);
        self
    }
}

/// Effects applied together with probability `numerator / denominator`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomGroup {
    pub id: String,
    pub chance_numerator: u32,
    pub chance_denominator: u32,
    pub effects: Vec<Effect>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::Amount;

    #[test]
    fn all_effects_includes_random_groups() {
        let rule = Rule {
            id: "r".into(),
            trigger: TriggerId::CardScored,
            condition_groups: vec![],
            effects: vec![Effect::new("e1", EffectKind::AddChips(Amount::Literal(1.0)))],
            random_groups: vec![RandomGroup {
                id: "g".into(),
                chance_numerator: 1,
                chance_denominator: 4,
                effects: vec![Effect::new("e2", EffectKind::DestroyCard)],
            }],
        };
        let ids: Vec<&str> = rule.all_effects().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert!(rule.destroys());
        assert!(!rule.retriggers());
    }

    #[test]
    fn unknown_kind_named_like_a_known_one_is_inert() {
        let rule = Rule {
            id: "r".into(),
            trigger: TriggerId::CardScored,
            condition_groups: vec![],
            effects: vec![
                Effect::new("e1", EffectKind::Unknown("destroy_card".into())),
                Effect::new("e2", EffectKind::Unknown("retrigger".into())),
            ],
            random_groups: vec![],
        };
        assert!(!rule.destroys());
        assert!(!rule.retriggers());
    }

    #[test]
    fn empty_message_is_dropped() {
        let effect = Effect::new("e", EffectKind::Balance).with_message("");
        assert_eq!(effect.custom_message, None);
        let effect = Effect::new("e", EffectKind::Balance).with_message("Even!");
        assert_eq!(effect.custom_message.as_deref(), Some("Even!"));
    }
}
