use std::collections::HashSet;

use super::condition::ConditionKind;
use super::effect::EffectKind;
use super::error::ModelError;
use super::expr::LogicOp;
use super::rule::{Condition, ConditionGroup, Effect, RandomGroup, Rule};
use super::trigger::TriggerId;
use super::value::Amount;

/// The kind of card-type object a unit compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Enhancement,
    Seal,
}

impl UnitKind {
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "enhancement" => Some(UnitKind::Enhancement),
            "seal" => Some(UnitKind::Seal),
            _ => None,
        }
    }

    /// Lua path of the table holding compiler-introduced variables.
    #[must_use]
    pub fn ability_path(self) -> &'static str {
        match self {
            UnitKind::Enhancement => "card.ability.extra",
            UnitKind::Seal => "card.ability.seal.extra",
        }
    }

    #[must_use]
    pub fn smods_class(self) -> &'static str {
        match self {
            UnitKind::Enhancement => "SMODS.Enhancement",
            UnitKind::Seal => "SMODS.Seal",
        }
    }

    #[must_use]
    pub fn output_dir(self) -> &'static str {
        match self {
            UnitKind::Enhancement => "enhancements",
            UnitKind::Seal => "seals",
        }
    }

    /// The key the runtime registers the object under.
    #[must_use]
    pub fn object_key(self, mod_prefix: &str, key: &str) -> String {
        match self {
            UnitKind::Enhancement => format!("m_{mod_prefix}_{key}"),
            UnitKind::Seal => format!("{mod_prefix}_{key}"),
        }
    }
}

/// A named number persisted in the unit's `extra` table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserVariable {
    pub name: String,
    pub initial: f64,
}

/// Header flags. Enhancement-only flags are ignored for seals and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFlags {
    pub any_suit: bool,
    pub replace_base_card: bool,
    pub no_rank: bool,
    pub no_suit: bool,
    pub always_scores: bool,
    pub weight: f64,
    /// Six hex digits, without `#`.
    pub badge_colour: String,
    pub unlocked: bool,
    pub discovered: bool,
    pub no_collection: bool,
}

impl Default for UnitFlags {
    fn default() -> Self {
        Self {
            any_suit: false,
            replace_base_card: false,
            no_rank: false,
            no_suit: false,
            always_scores: false,
            weight: 5.0,
            badge_colour: "000000".to_owned(),
            unlocked: true,
            discovered: true,
            no_collection: false,
        }
    }
}

/// One user-authored card type: the rules and presentation compiled into a
/// single Lua file.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub kind: UnitKind,
    pub key: String,
    pub name: String,
    /// Description lines; `#N#` marks the N-th description variable.
    pub description: Vec<String>,
    pub variables: Vec<UserVariable>,
    pub rules: Vec<Rule>,
    pub flags: UnitFlags,
}

impl Unit {
    /// Check the structural invariants the compiler relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] found.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !is_unit_key(&self.key) {
            return Err(ModelError::InvalidKey {
                key: self.key.clone(),
            });
        }

        let mut names = HashSet::new();
        for var in &self.variables {
            if !is_identifier(&var.name) {
                return Err(ModelError::InvalidVariable {
                    name: var.name.clone(),
                });
            }
            if !names.insert(var.name.as_str()) {
                return Err(ModelError::DuplicateVariable {
                    name: var.name.clone(),
                });
            }
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(ModelError::DuplicateRule {
                    unit: self.key.clone(),
                    rule: rule.id.clone(),
                });
            }
            if let Some(group) = rule
                .random_groups
                .iter()
                .find(|g| g.chance_denominator == 0)
            {
                return Err(ModelError::ZeroDenominator {
                    rule: rule.id.clone(),
                    group: group.id.clone(),
                });
            }
            if let Some(name) = variable_refs(rule).find(|name| !names.contains(name)) {
                return Err(ModelError::UndeclaredVariable {
                    rule: rule.id.clone(),
                    name: name.to_owned(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn output_path(&self) -> String {
        format!("{}/{}.lua", self.kind.output_dir(), self.key)
    }
}

/// Names of user variables a rule reads or writes.
fn variable_refs(rule: &Rule) -> impl Iterator<Item = &str> {
    let conditions = rule
        .condition_groups
        .iter()
        .flat_map(|g| &g.conditions)
        .flat_map(|c| {
            let amounts = c.kind.amounts().into_iter().filter_map(Amount::variable);
            c.kind.target_variable().into_iter().chain(amounts)
        });
    let effects = rule.all_effects().flat_map(|e| {
        let amounts = e.kind.amounts().into_iter().filter_map(Amount::variable);
        e.kind.target_variable().into_iter().chain(amounts)
    });
    conditions.chain(effects)
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_unit_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Builder for a [`Unit`].
///
/// # Example
///
/// ```
/// use ruleforge::{Amount, ConditionKind, CompareParams, CompareOp, EffectKind, UnitBuilder, UnitKind};
///
/// let unit = UnitBuilder::new(UnitKind::Enhancement, "glassy")
///     .name("Glassy")
///     .description("{C:chips}+#1#{} Chips")
///     .rule("rich", "card_scored", |r| {
///         r.when(ConditionKind::PlayerMoney(CompareParams::new(CompareOp::Gte, 20_i64)))
///             .effect(EffectKind::AddChips(Amount::Literal(30.0)))
///     })
///     .build()
///     .unwrap();
/// assert_eq!(unit.rules.len(), 1);
/// ```
#[derive(Debug)]
pub struct UnitBuilder {
    unit: Unit,
}

impl UnitBuilder {
    #[must_use]
    pub fn new(kind: UnitKind, key: &str) -> Self {
        Self {
            unit: Unit {
                kind,
                key: key.to_owned(),
                name: key.to_owned(),
                description: Vec::new(),
                variables: Vec::new(),
                rules: Vec::new(),
                flags: UnitFlags::default(),
            },
        }
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.unit.name);
        self
    }

    /// Append one description line.
    #[must_use]
    pub fn description(mut self, line: &str) -> Self {
        self.unit.description.push(line.to_owned());
        self
    }

    #[must_use]
    pub fn variable(mut self, name: &str, initial: f64) -> Self {
        self.unit.variables.push(UserVariable {
            name: name.to_owned(),
            initial,
        });
        self
    }

    #[must_use]
    pub fn flags(mut self, f: impl FnOnce(&mut UnitFlags)) -> Self {
        f(&mut self.unit.flags);
        self
    }

    /// Define a rule. The closure adds condition groups, effects and random groups.
    #[must_use]
    pub fn rule(
        mut self,
        id: &str,
        trigger: impl Into<TriggerId>,
        f: impl FnOnce(RuleBuilder) -> RuleBuilder,
    ) -> Self {
        let built = f(RuleBuilder::default());
        self.unit.rules.push(Rule {
            id: id.to_owned(),
            trigger: trigger.into(),
            condition_groups: built.groups,
            effects: built.effects,
            random_groups: built.random_groups,
        });
        self
    }

    /// Validate and return the unit.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if validation fails.
    pub fn build(self) -> Result<Unit, ModelError> {
        self.unit.validate()?;
        Ok(self.unit)
    }
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug, Default)]
pub struct RuleBuilder {
    groups: Vec<ConditionGroup>,
    effects: Vec<Effect>,
    random_groups: Vec<RandomGroup>,
    next_id: usize,
}

impl RuleBuilder {
    fn fresh_id(&mut self, prefix: char) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    /// Add a condition group built by the closure.
    #[must_use]
    pub fn group(mut self, f: impl FnOnce(GroupBuilder) -> GroupBuilder) -> Self {
        let built = f(GroupBuilder::default());
        let id = self.fresh_id('g');
        self.groups.push(ConditionGroup {
            id,
            operator: LogicOp::And,
            conditions: built.conditions,
        });
        self
    }

    /// Add a group holding a single condition.
    #[must_use]
    pub fn when(self, kind: ConditionKind) -> Self {
        self.group(|g| g.when(kind))
    }

    #[must_use]
    pub fn effect(mut self, kind: EffectKind) -> Self {
        let id = self.fresh_id('e');
        self.effects.push(Effect::new(id, kind));
        self
    }

    #[must_use]
    pub fn effect_with_message(mut self, kind: EffectKind, message: &str) -> Self {
        let id = self.fresh_id('e');
        self.effects.push(Effect::new(id, kind).with_message(message));
        self
    }

    /// Add a random group applying `effects` with probability
    /// `numerator / denominator`. The numerator is clamped to at least 1.
    #[must_use]
    pub fn random(
        mut self,
        numerator: u32,
        denominator: u32,
        effects: impl IntoIterator<Item = EffectKind>,
    ) -> Self {
        let id = self.fresh_id('r');
        let effects = effects
            .into_iter()
            .enumerate()
            .map(|(i, kind)| Effect::new(format!("{id}_e{}", i + 1), kind))
            .collect();
        self.random_groups.push(RandomGroup {
            id,
            chance_numerator: numerator.max(1),
            chance_denominator: denominator,
            effects,
        });
        self
    }
}

/// Builds one condition group.
///
/// [`and`](Self::and) and [`or`](Self::or) set the join between the previous
/// condition and the one being added.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    conditions: Vec<Condition>,
}

impl GroupBuilder {
    fn push(mut self, join: LogicOp, condition: Condition) -> Self {
        if let Some(last) = self.conditions.last_mut() {
            last.operator = join;
        }
        self.conditions.push(condition);
        self
    }

    fn next(&self, kind: ConditionKind) -> Condition {
        Condition::new(format!("c{}", self.conditions.len() + 1), kind)
    }

    #[must_use]
    pub fn when(self, kind: ConditionKind) -> Self {
        let c = self.next(kind);
        self.push(LogicOp::And, c)
    }

    #[must_use]
    pub fn when_not(self, kind: ConditionKind) -> Self {
        let c = self.next(kind).negated();
        self.push(LogicOp::And, c)
    }

    #[must_use]
    pub fn and(self, kind: ConditionKind) -> Self {
        self.when(kind)
    }

    #[must_use]
    pub fn and_not(self, kind: ConditionKind) -> Self {
        self.when_not(kind)
    }

    #[must_use]
    pub fn or(self, kind: ConditionKind) -> Self {
        let c = self.next(kind);
        self.push(LogicOp::Or, c)
    }

    #[must_use]
    pub fn or_not(self, kind: ConditionKind) -> Self {
        let c = self.next(kind).negated();
        self.push(LogicOp::Or, c)
    }

    /// Push a fully specified condition without touching the previous join.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}
