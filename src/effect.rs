//! Lowering of effects and random groups into statements and a result table.
//!
//! Each effect lowers to a [`Lowered`] value: procedural statements that
//! must run first, and declarative `key = value` fields for the table the
//! runtime reads. When no effect needs statements, the fields of all effects
//! merge into one [`ResultTable`]; otherwise each effect's fields become an
//! explicit `SMODS.calculate_effect` call after the statements.

use std::fmt;

use tracing::debug;

use crate::lua::{inline_amount, lua_key, lua_string, LuaWriter};
use crate::scope::Scope;
use crate::types::{
    is_identifier, Amount, Colour, ConsumableParams, CopyTarget, EditCardParams, EditOp,
    EditParams, Effect, EffectKind, JokerSpawnParams, ModifyVariableParams, RandomGroup, VarOp,
};
use crate::vars::ConfigVars;

/// One `key = value` entry of a Lua table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// The table returned from `calculate`. Each effect contributes one level;
/// later effects nest under `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTable {
    pub fields: Vec<Field>,
    pub extra: Option<Box<ResultTable>>,
}

impl ResultTable {
    fn from_levels(levels: impl IntoIterator<Item = Vec<Field>>) -> Option<Self> {
        let levels: Vec<Vec<Field>> = levels.into_iter().filter(|l| !l.is_empty()).collect();
        levels.into_iter().rev().fold(None, |inner, fields| {
            Some(ResultTable {
                fields,
                extra: inner.map(Box::new),
            })
        })
    }

    /// Field keys from the outermost level inward.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.iter().map(|f| f.key.as_str()).collect();
        if let Some(extra) = &self.extra {
            keys.extend(extra.keys());
        }
        keys
    }

    fn write(&self, w: &mut LuaWriter) {
        for field in &self.fields {
            w.line(&format!("{field},"));
        }
        if let Some(extra) = &self.extra {
            w.open("extra = {");
            extra.write(w);
            w.close("},");
        }
    }

    /// The table as a multi-line Lua table constructor.
    #[must_use]
    pub fn to_lua(&self) -> String {
        let mut w = LuaWriter::new();
        w.open("{");
        self.write(&mut w);
        w.close("}");
        w.finish().trim_end().to_owned()
    }
}

/// A probability variable bound by a random group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbabilityVar {
    /// Config variable holding the denominator, e.g. `odds2`.
    pub name: String,
    pub numerator: u32,
}

/// Everything one rule's effects compile to.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutput {
    pub procedural: Vec<String>,
    pub result: Option<ResultTable>,
    pub primary_color: Colour,
    /// `name = value` texts bound during this compilation, first occurrence first.
    pub config_vars: Vec<String>,
    pub custom_guard: Option<String>,
    pub probability_vars: Vec<ProbabilityVar>,
}

impl EffectOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedural.is_empty() && self.result.is_none()
    }
}

#[derive(Debug, Default)]
struct Lowered {
    statements: Vec<String>,
    fields: Vec<Field>,
    colour: Colour,
    custom_guard: Option<String>,
}

impl Lowered {
    fn field(colour: Colour, key: &str, value: impl Into<String>) -> Self {
        Self {
            fields: vec![Field::new(key, value)],
            colour,
            ..Self::default()
        }
    }

    fn statements(colour: Colour, statements: Vec<String>) -> Self {
        Self {
            statements,
            colour,
            ..Self::default()
        }
    }

    fn with_message(mut self, text: &str) -> Self {
        self.fields.retain(|f| f.key != "message" && f.key != "colour");
        self.fields.push(Field::new("message", lua_string(text)));
        self.fields.push(Field::new("colour", self.colour.to_string()));
        self
    }
}

/// Binds literal amounts to config variables and records what was touched.
struct Binder<'a> {
    scope: &'a Scope,
    vars: &'a mut ConfigVars,
    touched: Vec<String>,
}

impl<'a> Binder<'a> {
    fn new(scope: &'a Scope, vars: &'a mut ConfigVars) -> Self {
        Self {
            scope,
            vars,
            touched: Vec::new(),
        }
    }

    /// Literals become `<ability>.<name>`; everything else renders inline.
    fn bind(&mut self, base: &str, amount: &Amount) -> String {
        match amount {
            Amount::Literal(v) => {
                let var = self.vars.claim(base, *v);
                let (name, entry) = (var.name.clone(), var.entry());
                self.touch(entry);
                format!("{}.{name}", self.scope.ability())
            }
            other => inline_amount(other, self.scope, base),
        }
    }

    fn bind_odds(&mut self, denominator: u32) -> String {
        let var = self.vars.claim_odds(denominator);
        let (name, entry) = (var.name.clone(), var.entry());
        self.touch(entry);
        name
    }

    fn touch(&mut self, entry: String) {
        if !self.touched.contains(&entry) {
            self.touched.push(entry);
        }
    }
}

/// Compile the plain effects and random groups of one rule.
///
/// Literal amounts are bound through `vars`, which is shared by all rules of
/// a unit so equal values reuse one variable.
pub fn compile_effects(
    effects: &[Effect],
    random_groups: &[RandomGroup],
    scope: &Scope,
    vars: &mut ConfigVars,
) -> EffectOutput {
    let mut binder = Binder::new(scope, vars);
    let lowered: Vec<Lowered> = effects
        .iter()
        .filter_map(|e| lower_effect(e, &mut binder))
        .collect();

    let primary_color = lowered.first().map_or(Colour::White, |l| l.colour);
    let custom_guard = join_guards(&lowered);

    let mut procedural: Vec<String> = lowered
        .iter()
        .flat_map(|l| l.statements.iter().cloned())
        .collect();
    let result = if procedural.is_empty() {
        ResultTable::from_levels(lowered.into_iter().map(|l| l.fields))
    } else {
        procedural.extend(
            lowered
                .iter()
                .filter(|l| !l.fields.is_empty())
                .map(|l| calculate_effect_call(&l.fields)),
        );
        None
    };

    let mut probability_vars = Vec::new();
    for (index, group) in random_groups.iter().enumerate() {
        let inner: Vec<Lowered> = group
            .effects
            .iter()
            .filter_map(|e| lower_effect(e, &mut binder))
            .collect();
        if inner.is_empty() {
            debug!(group = %group.id, "random group with nothing to apply; skipped");
            continue;
        }
        let odds = binder.bind_odds(group.chance_denominator);
        let numerator = group.chance_numerator.max(1);
        procedural.push(random_block(index, group, numerator, &odds, &inner, scope));
        probability_vars.push(ProbabilityVar {
            name: odds,
            numerator,
        });
    }

    EffectOutput {
        procedural,
        result,
        primary_color,
        config_vars: binder.touched,
        custom_guard,
        probability_vars,
    }
}

fn join_guards(lowered: &[Lowered]) -> Option<String> {
    let guards: Vec<&str> = lowered
        .iter()
        .filter_map(|l| l.custom_guard.as_deref())
        .collect();
    (!guards.is_empty()).then(|| guards.join(" and "))
}

fn calculate_effect_call(fields: &[Field]) -> String {
    let body: Vec<String> = fields.iter().map(Field::to_string).collect();
    format!("SMODS.calculate_effect({{ {} }}, card)", body.join(", "))
}

fn random_block(
    index: usize,
    group: &RandomGroup,
    numerator: u32,
    odds: &str,
    inner: &[Lowered],
    scope: &Scope,
) -> String {
    let seed: String = group
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut check = format!(
        "SMODS.pseudorandom_probability(card, 'group_{index}_{seed}', {numerator}, {}.{odds}, {})",
        scope.ability(),
        lua_key(scope.object_key())
    );
    if let Some(guard) = join_guards(inner) {
        check.push_str(" and ");
        check.push_str(&guard);
    }

    let mut w = LuaWriter::new();
    w.open(&format!("if {check} then"));
    for statement in inner.iter().flat_map(|l| &l.statements) {
        w.line(statement);
    }
    for l in inner.iter().filter(|l| !l.fields.is_empty()) {
        w.line(&calculate_effect_call(&l.fields));
    }
    w.close("end");
    w.finish().trim_end().to_owned()
}

fn lower_effect(effect: &Effect, b: &mut Binder<'_>) -> Option<Lowered> {
    let lowered = lower_kind(&effect.kind, b)?;
    Some(match &effect.custom_message {
        Some(text) => lowered.with_message(text),
        None => lowered,
    })
}

fn lower_kind(kind: &EffectKind, b: &mut Binder<'_>) -> Option<Lowered> {
    Some(match kind {
        EffectKind::AddChips(v) => Lowered::field(Colour::Chips, "chips", b.bind("chips", v)),
        EffectKind::AddMult(v) => Lowered::field(Colour::Mult, "mult", b.bind("mult", v)),
        EffectKind::ApplyXMult(v) => {
            Lowered::field(Colour::XMult, "x_mult", b.bind("x_mult", v))
        }
        EffectKind::ApplyXChips(v) => {
            Lowered::field(Colour::Chips, "x_chips", b.bind("x_chips", v))
        }
        EffectKind::AddDollars(v) => {
            Lowered::field(Colour::Money, "dollars", b.bind("dollars", v))
        }
        EffectKind::Retrigger(v) => Lowered::statements(
            Colour::Orange,
            vec![
                "card.should_retrigger = true".to_owned(),
                format!("card.retrigger_times = {}", b.bind("repetitions", v)),
            ],
        ),
        EffectKind::DestroyCard => {
            Lowered::statements(Colour::Red, vec!["card.should_destroy = true".to_owned()])
        }
        EffectKind::LevelUpHand(p) => {
            let levels = b.bind("levels", &p.levels);
            match &p.hand {
                None => Lowered::field(Colour::Red, "level_up", levels),
                Some(hand) => Lowered::statements(
                    Colour::Red,
                    vec![format!(
                        "level_up_hand(card, {}, true, {levels})",
                        lua_string(hand)
                    )],
                ),
            }
        }
        EffectKind::EditHandSize(p) => edit_counter(
            p,
            b,
            ("hand_size", "G.hand.config.card_limit"),
            |d| format!("G.hand:change_size({d})"),
            Colour::Blue,
        ),
        EffectKind::EditHands(p) => edit_counter(
            p,
            b,
            ("hands", "G.GAME.current_round.hands_left"),
            |d| format!("ease_hands_played({d})"),
            Colour::Blue,
        ),
        EffectKind::EditDiscards(p) => edit_counter(
            p,
            b,
            ("discards", "G.GAME.current_round.discards_left"),
            |d| format!("ease_discard({d})"),
            Colour::Red,
        ),
        EffectKind::EditDollars(p) => edit_counter(
            p,
            b,
            ("money", "G.GAME.dollars"),
            |d| format!("ease_dollars({d})"),
            Colour::Money,
        ),
        EffectKind::CreateConsumable(p) => create_consumable(p),
        EffectKind::CreateJoker(p) => create_joker(p),
        EffectKind::CopyCard(target) => copy_card(*target),
        EffectKind::EditCard(p) => edit_card(p)?,
        EffectKind::ModifyVariable(p) => modify_variable(p, b.scope)?,
        EffectKind::Balance => Lowered::field(Colour::Purple, "balance", "true"),
        EffectKind::SwapChipsMult => Lowered::field(Colour::Purple, "swap", "true"),
        EffectKind::ShowMessage(p) => {
            if p.text.is_empty() {
                debug!("show_message without text; dropped");
                return None;
            }
            Lowered {
                colour: p.colour,
                ..Lowered::default()
            }
            .with_message(&p.text)
        }
        EffectKind::Unknown(id) => {
            debug!(effect = %id, "unknown effect kind; dropped");
            return None;
        }
    })
}

/// Add to, subtract from or set a game counter through its runtime call.
fn edit_counter(
    p: &EditParams,
    b: &mut Binder<'_>,
    (base, current): (&str, &str),
    call: fn(&str) -> String,
    colour: Colour,
) -> Lowered {
    let value = b.bind(base, &p.value);
    let delta = match p.operation {
        EditOp::Add => value,
        EditOp::Subtract => format!("-{value}"),
        EditOp::Set => format!("{value} - {current}"),
    };
    Lowered::statements(colour, vec![call(&delta)])
}

fn spawn_in_event(buffer: &str, call: &str) -> String {
    format!(
        "G.GAME.{buffer} = G.GAME.{buffer} + 1
G.E_MANAGER:add_event(Event({{
    func = function()
        {call}
        G.GAME.{buffer} = 0
        return true
    end
}}))"
    )
}

fn create_consumable(p: &ConsumableParams) -> Lowered {
    let mut card_args = format!("set = {}", lua_string(p.set.name()));
    if let Some(key) = &p.key {
        card_args.push_str(", key = ");
        card_args.push_str(&lua_string(key));
    }
    Lowered {
        statements: vec![spawn_in_event(
            "consumeable_buffer",
            &format!("SMODS.add_card({{ {card_args} }})"),
        )],
        fields: Vec::new(),
        colour: p.set.colour(),
        custom_guard: Some(
            "#G.consumeables.cards + G.GAME.consumeable_buffer < G.consumeables.config.card_limit"
                .to_owned(),
        ),
    }
}

fn create_joker(p: &JokerSpawnParams) -> Lowered {
    let mut card_args = "set = \"Joker\"".to_owned();
    if let Some(key) = &p.key {
        card_args.push_str(", key = ");
        card_args.push_str(&lua_string(key));
    } else if let Some(rarity) = p.rarity {
        card_args.push_str(", rarity = ");
        card_args.push_str(&lua_string(rarity.name()));
    }
    Lowered {
        statements: vec![spawn_in_event(
            "joker_buffer",
            &format!("SMODS.add_card({{ {card_args} }})"),
        )],
        fields: Vec::new(),
        colour: Colour::Blue,
        custom_guard: Some(
            "#G.jokers.cards + G.GAME.joker_buffer < G.jokers.config.card_limit".to_owned(),
        ),
    }
}

fn copy_card(target: CopyTarget) -> Lowered {
    let area = match target {
        CopyTarget::Deck => "G.deck",
        CopyTarget::Hand => "G.hand",
    };
    let statement = format!(
        "G.playing_card = (G.playing_card and G.playing_card + 1) or 1
local copied_card = copy_card(card, nil, nil, G.playing_card)
copied_card:add_to_deck()
G.deck.config.card_limit = G.deck.config.card_limit + 1
table.insert(G.playing_cards, copied_card)
{area}:emplace(copied_card)
copied_card.states.visible = nil
G.E_MANAGER:add_event(Event({{
    func = function()
        copied_card:start_materialize()
        return true
    end
}}))"
    );
    Lowered::statements(Colour::Chips, vec![statement])
}

fn edit_card(p: &EditCardParams) -> Option<Lowered> {
    if p.is_noop() {
        debug!("edit_card changes nothing; dropped");
        return None;
    }
    let mut statements = Vec::new();
    if p.suit.is_some() || p.rank.is_some() {
        let suit = p.suit.map_or_else(|| "nil".to_owned(), |s| lua_string(s.name()));
        let rank = p.rank.map_or_else(|| "nil".to_owned(), |r| lua_string(&r.name()));
        statements.push(format!("assert(SMODS.change_base(card, {suit}, {rank}))"));
    }
    if let Some(enhancement) = &p.enhancement {
        statements.push(format!(
            "card:set_ability(G.P_CENTERS[{}])",
            lua_string(enhancement)
        ));
    }
    if let Some(seal) = &p.seal {
        statements.push(format!("card:set_seal({}, true)", lua_string(seal)));
    }
    if let Some(edition) = &p.edition {
        statements.push(format!("card:set_edition({}, true)", lua_string(edition)));
    }
    Some(Lowered::statements(Colour::Blue, statements))
}

/// Amounts render inline so the variable's own name stays unclaimed.
fn modify_variable(p: &ModifyVariableParams, scope: &Scope) -> Option<Lowered> {
    let Some(variable) = p.variable.as_deref().filter(|v| is_identifier(v)) else {
        debug!(variable = ?p.variable, "modify_variable without a valid variable; dropped");
        return None;
    };
    let target = format!("{}.{variable}", scope.ability());
    let value = inline_amount(&p.value, scope, variable);
    let rhs = match p.operation {
        VarOp::Set => value,
        VarOp::Increment => format!("{target} + {value}"),
        VarOp::Decrement => format!("{target} - {value}"),
        VarOp::Multiply => format!("{target} * {value}"),
        VarOp::Divide => format!("{target} / {value}"),
    };
    Some(Lowered::statements(
        Colour::Green,
        vec![format!("{target} = {rhs}")],
    ))
}
