//! Composition of one unit's compiled rules into a Lua file.

use tracing::trace;

use crate::compiler::CompileOptions;
use crate::condition::condition_expr;
use crate::effect::{compile_effects, EffectOutput, ProbabilityVar};
use crate::lua::{inline_amount, lua_key, lua_number, lua_string, LuaWriter};
use crate::parse::placeholder_count;
use crate::scope::Scope;
use crate::trigger::{resolve_trigger, static_field};
use crate::types::{Amount, Artifact, Effect, Expr, Position, Rule, TriggerId, Unit, UnitKind};
use crate::vars::{ConfigVars, VarKind};

const DESTROY_EXIT: &str = "if context.destroy_card and context.destroy_card == card and card.should_destroy then
    return { remove = true }
end";

const RETRIGGER_EXIT: &str = "if context.repetition and card.should_retrigger then
    return { repetitions = card.retrigger_times }
end";

/// Static config fields folded from unconditional effects, in first-seen order.
#[derive(Debug, Default)]
struct StaticConfig {
    fields: Vec<(&'static str, f64)>,
}

impl StaticConfig {
    /// Fold `effect` into a static field. Returns false if it must stay dynamic.
    fn try_fold(&mut self, trigger: &TriggerId, effect: &Effect) -> bool {
        if effect.custom_message.is_some() {
            return false;
        }
        let Some(field) = static_field(trigger, &effect.kind) else {
            return false;
        };
        let Some(value) = effect.kind.amounts().first().and_then(|a| a.literal()) else {
            return false;
        };
        match self.fields.iter_mut().find(|(name, _)| *name == field.name) {
            Some(entry) => entry.1 = field.fold.combine(entry.1, value),
            None => self.fields.push((field.name, value)),
        }
        true
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// What the rules of one unit contribute beyond their clauses.
#[derive(Debug, Default)]
struct Collected {
    clauses: Vec<String>,
    game_vars: Vec<String>,
    probability: Vec<ProbabilityVar>,
}

pub(crate) fn assemble(unit: &Unit, options: &CompileOptions, position: Position) -> Artifact {
    let object_key = unit.kind.object_key(options.prefix(), &unit.key);
    let mut vars = ConfigVars::with_user(&unit.variables);
    let mut statics = StaticConfig::default();
    let mut collected = Collected::default();

    for rule in &unit.rules {
        let scope = Scope::new(unit.kind, rule.trigger.clone(), object_key.as_str());
        let chain = condition_expr(rule, &scope);
        let unconditional = chain.is_none() && rule.random_groups.is_empty();

        let remaining: Vec<Effect> = if unconditional && unit.kind == UnitKind::Enhancement {
            rule.effects
                .iter()
                .filter(|e| !statics.try_fold(&rule.trigger, e))
                .cloned()
                .collect()
        } else {
            rule.effects.clone()
        };

        for amount in rule.all_effects().flat_map(|e| e.kind.amounts()) {
            if let Amount::GameVar { .. } = amount {
                let expr = inline_amount(amount, &scope, "");
                if !collected.game_vars.contains(&expr) {
                    collected.game_vars.push(expr);
                }
            }
        }

        let output = compile_effects(&remaining, &rule.random_groups, &scope, &mut vars);
        if output.is_empty() {
            trace!(unit = %unit.key, rule = %rule.id, "rule has nothing to emit");
            continue;
        }
        for p in &output.probability_vars {
            if !collected.probability.iter().any(|q| q.name == p.name) {
                collected.probability.push(p.clone());
            }
        }
        trace!(
            unit = %unit.key,
            rule = %rule.id,
            statements = output.procedural.len(),
            fast_path = output.result.is_some(),
            "compiled rule"
        );
        collected.clauses.push(render_rule(rule, chain, &output));
    }

    let uses_destroy = unit.rules.iter().any(Rule::destroys);
    let uses_retrigger = unit.rules.iter().any(Rule::retriggers);

    let mut w = LuaWriter::new();
    w.open(&format!("{} {{", unit.kind.smods_class()));
    w.line(&format!("key = {},", lua_string(&unit.key)));
    w.line(&format!("pos = {{ x = {}, y = {} }},", position.x, position.y));
    write_config(&mut w, &statics, &vars);
    if unit.kind == UnitKind::Seal {
        w.line(&format!(
            "badge_colour = HEX({}),",
            lua_string(&unit.flags.badge_colour)
        ));
    }
    write_loc_txt(&mut w, unit);
    w.line(&format!("atlas = {},", lua_string(options.atlas_name())));
    write_flags(&mut w, unit);
    if let Some(loc_vars) = loc_vars(unit, &statics, &vars, &collected, &object_key) {
        w.line(&loc_vars);
    }
    if uses_destroy || uses_retrigger || !collected.clauses.is_empty() {
        w.open("calculate = function(self, card, context)");
        if uses_destroy {
            w.line(DESTROY_EXIT);
        }
        if uses_retrigger {
            w.line(RETRIGGER_EXIT);
        }
        for clause in &collected.clauses {
            w.line(clause);
        }
        w.close("end,");
    }
    w.close("}");

    Artifact {
        path: unit.output_path(),
        source: w.finish(),
        position,
    }
}

/// One rule as a guarded clause, preceded by flag resets when needed.
fn render_rule(rule: &Rule, chain: Option<Expr>, output: &EffectOutput) -> String {
    let guard = resolve_trigger(&rule.trigger).guard;
    let mut w = LuaWriter::new();

    let resets: Vec<&str> = [
        (rule.destroys(), "card.should_destroy = false"),
        (rule.retriggers(), "card.should_retrigger = false"),
    ]
    .into_iter()
    .filter(|(used, _)| *used)
    .map(|(_, reset)| reset)
    .collect();
    if !resets.is_empty() {
        if let Some(guard) = guard {
            w.open(&format!("if {guard} then"));
        }
        for reset in &resets {
            w.line(reset);
        }
        if guard.is_some() {
            w.close("end");
        }
    }

    let condition = [
        guard.map(Expr::atom),
        chain.map(Expr::paren),
        output
            .custom_guard
            .as_deref()
            .map(|g| Expr::atom(g).paren()),
    ]
    .into_iter()
    .flatten()
    .reduce(Expr::and);

    match &condition {
        Some(condition) => w.open(&format!("if {condition} then")),
        None => w.open("do"),
    }
    for statement in &output.procedural {
        w.line(statement);
    }
    if let Some(result) = &output.result {
        w.line(&format!("return {}", result.to_lua()));
    }
    w.close("end");
    w.finish()
}

fn write_config(w: &mut LuaWriter, statics: &StaticConfig, vars: &ConfigVars) {
    if statics.is_empty() && vars.is_empty() {
        return;
    }
    w.open("config = {");
    for (name, value) in &statics.fields {
        w.line(&format!("{name} = {},", lua_number(*value)));
    }
    if !vars.is_empty() {
        w.open("extra = {");
        for var in vars.iter() {
            w.line(&format!("{},", var.entry()));
        }
        w.close("},");
    }
    w.close("},");
}

fn write_loc_txt(w: &mut LuaWriter, unit: &Unit) {
    w.open("loc_txt = {");
    w.line(&format!("name = {},", lua_string(&unit.name)));
    w.open("text = {");
    for (i, line) in unit.description.iter().enumerate() {
        w.line(&format!("[{}] = {},", i + 1, lua_string(line)));
    }
    w.close("},");
    w.close("},");
}

fn write_flags(w: &mut LuaWriter, unit: &Unit) {
    let flags = &unit.flags;
    if unit.kind == UnitKind::Enhancement {
        w.line(&format!("any_suit = {},", flags.any_suit));
        w.line(&format!("replace_base_card = {},", flags.replace_base_card));
        w.line(&format!("no_rank = {},", flags.no_rank));
        w.line(&format!("no_suit = {},", flags.no_suit));
        w.line(&format!("always_scores = {},", flags.always_scores));
    }
    w.line(&format!("unlocked = {},", flags.unlocked));
    w.line(&format!("discovered = {},", flags.discovered));
    w.line(&format!("no_collection = {},", flags.no_collection));
    if unit.kind == UnitKind::Enhancement {
        w.line(&format!("weight = {},", lua_number(flags.weight)));
    }
}

/// The `loc_vars` function, one value per distinct `#N#` in the description.
///
/// Values bind in order: folded static fields, game-variable expressions,
/// probability pairs, then the remaining config variables.
fn loc_vars(
    unit: &Unit,
    statics: &StaticConfig,
    vars: &ConfigVars,
    collected: &Collected,
    object_key: &str,
) -> Option<String> {
    let count = placeholder_count(unit.description.iter().map(String::as_str))?;
    let ability = unit.kind.ability_path();

    let mut values: Vec<String> = statics
        .fields
        .iter()
        .map(|(name, _)| format!("card.ability.{name}"))
        .collect();
    values.extend(collected.game_vars.iter().cloned());

    let mut locals = Vec::new();
    for p in &collected.probability {
        let suffix = p.name.strip_prefix("odds").unwrap_or_default();
        let numerator = format!("new_numerator{suffix}");
        let denominator = format!("new_denominator{suffix}");
        locals.push((
            numerator.clone(),
            format!(
                "local {numerator}, {denominator} = SMODS.get_probability_vars(card, {}, {ability}.{}, {})",
                p.numerator,
                p.name,
                lua_key(object_key)
            ),
        ));
        values.push(numerator);
        values.push(denominator);
    }

    values.extend(
        vars.iter()
            .filter(|v| v.kind != VarKind::Odds)
            .map(|v| format!("{ability}.{}", v.name)),
    );

    values.resize(count, "0".to_owned());

    let mut w = LuaWriter::new();
    w.open("loc_vars = function(self, info_queue, card)");
    for (numerator, local) in &locals {
        if values.contains(numerator) {
            w.line(local);
        }
    }
    w.line(&format!("return {{ vars = {{ {} }} }}", values.join(", ")));
    w.close("end,");
    Some(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CompareOp, CompareParams, ConditionKind, EffectKind, GameVar, UnitBuilder,
    };

    fn options() -> CompileOptions {
        CompileOptions::default().mod_prefix("mod")
    }

    fn build(builder: UnitBuilder) -> Artifact {
        assemble(&builder.build().unwrap(), &options(), Position::default())
    }

    fn chips(v: f64) -> EffectKind {
        EffectKind::AddChips(Amount::Literal(v))
    }

    #[test]
    fn unconditional_chips_fold_into_bonus() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "glassy")
                .rule("r", "card_scored", |r| r.effect(chips(30.0))),
        );
        assert!(artifact.source.contains("config = {\n        bonus = 30,\n    },"));
        assert!(!artifact.source.contains("calculate"));
        assert_eq!(artifact.path, "enhancements/glassy.lua");
    }

    #[test]
    fn folded_fields_accumulate() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .rule("a", "card_scored", |r| {
                    r.effect(chips(10.0))
                        .effect(EffectKind::ApplyXMult(Amount::Literal(1.5)))
                })
                .rule("b", "card_scored", |r| {
                    r.effect(chips(20.0))
                        .effect(EffectKind::ApplyXMult(Amount::Literal(2.0)))
                }),
        );
        assert!(artifact.source.contains("bonus = 30,"));
        assert!(artifact.source.contains("x_mult = 3,"));
    }

    #[test]
    fn seals_never_fold() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Seal, "ruby")
                .rule("r", "card_scored", |r| r.effect(chips(30.0))),
        );
        assert!(artifact.source.starts_with("SMODS.Seal {\n"));
        assert!(artifact.source.contains("extra = {\n            chips = 30,"));
        assert!(artifact
            .source
            .contains("chips = card.ability.seal.extra.chips,"));
        assert!(artifact.source.contains("badge_colour = HEX(\"000000\"),"));
        assert_eq!(artifact.path, "seals/ruby.lua");
    }

    #[test]
    fn conditional_rule_emits_guarded_clause() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k").rule("r", "card_scored", |r| {
                r.when(ConditionKind::PlayerMoney(CompareParams::new(CompareOp::Gte, 20_i64)))
                    .effect(chips(30.0))
            }),
        );
        assert!(artifact.source.contains(
            "if context.main_scoring and context.cardarea == G.play and (G.GAME.dollars >= 20) then"
        ));
        assert!(artifact.source.contains("return {\n                chips = card.ability.extra.chips,\n            }"));
    }

    #[test]
    fn unknown_trigger_without_conditions_uses_do_block() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Seal, "k")
                .rule("r", "on_shop_enter", |r| r.effect(EffectKind::Balance)),
        );
        assert!(artifact.source.contains("        do\n            return {\n"));
    }

    #[test]
    fn destroy_adds_fast_exit_and_reset() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k").rule("r", "card_discarded", |r| {
                r.effect(EffectKind::DestroyCard)
            }),
        );
        let src = &artifact.source;
        let exit = src.find("if context.destroy_card and context.destroy_card == card and card.should_destroy then").unwrap();
        let reset = src.find("card.should_destroy = false").unwrap();
        let set = src.find("card.should_destroy = true").unwrap();
        assert!(exit < reset && reset < set);
        assert!(!src.contains("context.repetition"));
    }

    #[test]
    fn loc_vars_pad_to_placeholders() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("+#1# Chips, #2# and #3#")
                .rule("r", "card_scored", |r| r.effect(chips(30.0))),
        );
        assert!(artifact
            .source
            .contains("return { vars = { card.ability.bonus, 0, 0 } }"));
    }

    #[test]
    fn loc_vars_count_distinct_markers() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("#1# then #3000000#, #1# again")
                .rule("r", "card_scored", |r| r.effect(chips(30.0))),
        );
        assert!(artifact
            .source
            .contains("return { vars = { card.ability.bonus, 0 } }"));
        assert!(artifact.source.len() < 2_000);
    }

    #[test]
    fn loc_vars_truncate_and_skip_unused_probability_locals() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("#1#")
                .rule("flat", "card_scored", |r| r.effect(chips(30.0)))
                .rule("lucky", "card_scored", |r| {
                    r.random(1, 4, [EffectKind::DestroyCard])
                }),
        );
        assert!(artifact
            .source
            .contains("return { vars = { card.ability.bonus } }"));
        assert!(!artifact.source.contains("get_probability_vars"));
    }

    #[test]
    fn loc_vars_order_statics_game_vars_odds_then_config() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("#1# #2# #3# #4# #5#")
                .variable("count", 0.0)
                .rule("flat", "card_scored", |r| r.effect(chips(30.0)))
                .rule("rich", "card_scored", |r| {
                    r.effect(EffectKind::AddMult(Amount::game_var(GameVar::Money)))
                        .random(1, 4, [EffectKind::DestroyCard])
                }),
        );
        assert!(artifact.source.contains(
            "return { vars = { card.ability.bonus, G.GAME.dollars, new_numerator, new_denominator, card.ability.extra.count } }"
        ));
    }

    #[test]
    fn loc_vars_bind_probability_pairs() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("#1# in #2#")
                .rule("r", "card_scored", |r| r.random(1, 4, [EffectKind::DestroyCard])),
        );
        assert!(artifact.source.contains(
            "local new_numerator, new_denominator = SMODS.get_probability_vars(card, 1, card.ability.extra.odds, 'm_mod_k')"
        ));
        assert!(artifact
            .source
            .contains("return { vars = { new_numerator, new_denominator } }"));
    }

    #[test]
    fn no_placeholders_no_loc_vars() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .description("Plain text")
                .rule("r", "card_scored", |r| r.effect(chips(30.0))),
        );
        assert!(!artifact.source.contains("loc_vars"));
    }

    #[test]
    fn rule_with_only_unknown_effects_is_skipped() {
        let artifact = build(
            UnitBuilder::new(UnitKind::Enhancement, "k")
                .rule("r", "card_scored", |r| r.effect(EffectKind::Unknown("x".into()))),
        );
        assert!(!artifact.source.contains("calculate"));
        assert!(!artifact.source.contains("config"));
    }
}
