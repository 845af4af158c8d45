//! Loading units from the editor's JSON save data.
//!
//! The raw structs mirror the save format; conversion into the typed model
//! happens once here, through `ConditionKind::from_params` and
//! `EffectKind::from_params`.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ForgeError;
use crate::types::{
    Condition, ConditionGroup, ConditionKind, Effect, EffectKind, LogicOp, ModelError,
    ParamValue, Params, RandomGroup, Rule, Unit, UnitFlags, UnitKind, UserVariable,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnit {
    kind: String,
    key: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: RawDescription,
    #[serde(default, alias = "userVariables")]
    variables: Vec<RawVariable>,
    #[serde(default)]
    rules: Vec<RawRule>,
    #[serde(flatten)]
    flags: RawFlags,
}

/// Either a single string with embedded newlines or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDescription {
    Text(String),
    Lines(Vec<String>),
}

impl Default for RawDescription {
    fn default() -> Self {
        RawDescription::Lines(Vec::new())
    }
}

impl RawDescription {
    fn into_lines(self) -> Vec<String> {
        match self {
            RawDescription::Text(text) => text.lines().map(str::to_owned).collect(),
            RawDescription::Lines(lines) => lines,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariable {
    name: String,
    #[serde(default, alias = "initialValue", alias = "initial_value")]
    initial: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlags {
    #[serde(alias = "any_suit")]
    any_suit: Option<bool>,
    #[serde(alias = "replace_base_card")]
    replace_base_card: Option<bool>,
    #[serde(alias = "no_rank")]
    no_rank: Option<bool>,
    #[serde(alias = "no_suit")]
    no_suit: Option<bool>,
    #[serde(alias = "always_scores")]
    always_scores: Option<bool>,
    weight: Option<f64>,
    #[serde(alias = "badge_colour", alias = "badgeColor")]
    badge_colour: Option<String>,
    unlocked: Option<bool>,
    discovered: Option<bool>,
    #[serde(alias = "no_collection")]
    no_collection: Option<bool>,
}

impl RawFlags {
    fn into_flags(self) -> UnitFlags {
        let defaults = UnitFlags::default();
        UnitFlags {
            any_suit: self.any_suit.unwrap_or(defaults.any_suit),
            replace_base_card: self.replace_base_card.unwrap_or(defaults.replace_base_card),
            no_rank: self.no_rank.unwrap_or(defaults.no_rank),
            no_suit: self.no_suit.unwrap_or(defaults.no_suit),
            always_scores: self.always_scores.unwrap_or(defaults.always_scores),
            weight: self.weight.unwrap_or(defaults.weight),
            badge_colour: self
                .badge_colour
                .map(|c| c.trim_start_matches('#').to_owned())
                .unwrap_or(defaults.badge_colour),
            unlocked: self.unlocked.unwrap_or(defaults.unlocked),
            discovered: self.discovered.unwrap_or(defaults.discovered),
            no_collection: self.no_collection.unwrap_or(defaults.no_collection),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default)]
    id: String,
    trigger: String,
    #[serde(default, alias = "condition_groups")]
    condition_groups: Vec<RawGroup>,
    #[serde(default)]
    effects: Vec<RawEffect>,
    #[serde(default, alias = "random_groups")]
    random_groups: Vec<RawRandomGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    id: String,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    conditions: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    negate: bool,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEffect {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(default, alias = "custom_message")]
    custom_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRandomGroup {
    #[serde(default)]
    id: String,
    #[serde(default = "one", alias = "chance_numerator")]
    chance_numerator: f64,
    #[serde(default = "one", alias = "chance_denominator")]
    chance_denominator: f64,
    #[serde(default)]
    effects: Vec<RawEffect>,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBatch {
    Units(Vec<RawUnit>),
    Wrapped { units: Vec<RawUnit> },
}

fn logic_op(raw: Option<&str>) -> LogicOp {
    match raw.map(str::trim) {
        Some(op) if op.eq_ignore_ascii_case("or") => LogicOp::Or,
        _ => LogicOp::And,
    }
}

fn params(raw: Map<String, Value>) -> Params {
    let mut out = Params::new();
    for (key, value) in raw {
        let value = match value {
            Value::Number(n) => match n.as_f64() {
                Some(n) => ParamValue::Number(n),
                None => continue,
            },
            Value::String(s) => ParamValue::Text(s),
            Value::Bool(b) => ParamValue::Bool(b),
            other => {
                debug!(param = %key, value = %other, "unsupported parameter value; skipped");
                continue;
            }
        };
        out.insert(&key, value);
    }
    out
}

fn effect(raw: RawEffect, variables: &[&str]) -> Effect {
    let params = params(raw.params).with_variables(variables.iter().copied());
    let kind = EffectKind::from_params(&raw.kind, &params);
    let effect = Effect::new(raw.id, kind);
    match raw.custom_message {
        Some(message) => effect.with_message(message),
        None => effect,
    }
}

// Float-to-int `as` saturates, so negative or NaN chances become 0.
fn chance(value: f64) -> u32 {
    value as u32
}

fn rule(raw: RawRule, index: usize, variables: &[&str]) -> Rule {
    let id = if raw.id.is_empty() {
        format!("rule{}", index + 1)
    } else {
        raw.id
    };
    Rule {
        id,
        trigger: raw.trigger.as_str().into(),
        condition_groups: raw
            .condition_groups
            .into_iter()
            .map(|g| ConditionGroup {
                id: g.id,
                operator: logic_op(g.operator.as_deref()),
                conditions: g
                    .conditions
                    .into_iter()
                    .map(|c| Condition {
                        kind: ConditionKind::from_params(
                            &c.kind,
                            &params(c.params).with_variables(variables.iter().copied()),
                        ),
                        id: c.id,
                        negate: c.negate,
                        operator: logic_op(c.operator.as_deref()),
                    })
                    .collect(),
            })
            .collect(),
        effects: raw
            .effects
            .into_iter()
            .map(|e| effect(e, variables))
            .collect(),
        random_groups: raw
            .random_groups
            .into_iter()
            .map(|g| RandomGroup {
                id: g.id,
                chance_numerator: chance(g.chance_numerator).max(1),
                chance_denominator: chance(g.chance_denominator),
                effects: g
                    .effects
                    .into_iter()
                    .map(|e| effect(e, variables))
                    .collect(),
            })
            .collect(),
    }
}

fn unit(raw: RawUnit) -> Result<Unit, ModelError> {
    let kind = UnitKind::from_id(raw.kind.trim()).ok_or_else(|| ModelError::UnknownUnitKind {
        kind: raw.kind.clone(),
    })?;
    let variables: Vec<UserVariable> = raw
        .variables
        .into_iter()
        .map(|v| UserVariable {
            name: v.name,
            initial: v.initial,
        })
        .collect();
    let names: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
    let rules = raw
        .rules
        .into_iter()
        .enumerate()
        .map(|(i, r)| rule(r, i, &names))
        .collect();
    let unit = Unit {
        kind,
        name: raw.name.unwrap_or_else(|| raw.key.clone()),
        key: raw.key,
        description: raw.description.into_lines(),
        variables,
        rules,
        flags: raw.flags.into_flags(),
    };
    unit.validate()?;
    Ok(unit)
}

impl Unit {
    /// Parse and validate one unit from editor JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Json`] for malformed JSON and
    /// [`ForgeError::Model`] when the unit fails validation.
    pub fn from_json(input: &str) -> Result<Self, ForgeError> {
        let raw: RawUnit = serde_json::from_str(input)?;
        Ok(unit(raw)?)
    }

    /// Read a JSON file holding one unit.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError`] on I/O, JSON or validation failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }
}

/// Parse a batch of units: either a JSON array or an object with a `units`
/// array.
///
/// # Errors
///
/// Returns the JSON error, or the first unit that fails validation.
pub fn load_units(input: &str) -> Result<Vec<Unit>, ForgeError> {
    let raw = match serde_json::from_str(input)? {
        RawBatch::Units(units) | RawBatch::Wrapped { units } => units,
    };
    let units = raw
        .into_iter()
        .map(unit)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(units = units.len(), "loaded units");
    Ok(units)
}
