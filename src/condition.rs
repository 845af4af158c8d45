//! Lowering of condition groups into one Lua boolean expression.

use tracing::debug;

use crate::lua::{inline_amount, lua_string};
use crate::scope::Scope;
use crate::types::{
    is_identifier, Amount, BlindKind, CardSlot, CompareOp, CompareParams, Condition, ConditionGroup,
    ConditionKind, DeckSource, EnhancementCountParams, Expr, GameVar, HandMatch, HandScope,
    HandTypeParams, LogicOp, RankGroup, RankTest, Rule, SuitGroup, SuitTest, TriggerId,
};

/// Compile a rule's condition groups to Lua text; `""` when unconstrained.
#[must_use]
pub fn compile_condition_chain(rule: &Rule, scope: &Scope) -> String {
    condition_expr(rule, scope)
        .map(|expr| expr.to_string())
        .unwrap_or_default()
}

/// The rule's condition groups as one expression, or `None` when no
/// condition contributes.
///
/// Groups are always joined with `and`; each group is parenthesized when
/// more than one contributes.
#[must_use]
pub fn condition_expr(rule: &Rule, scope: &Scope) -> Option<Expr> {
    let groups: Vec<Expr> = rule
        .condition_groups
        .iter()
        .filter_map(|group| group_expr(group, scope))
        .collect();

    if groups.len() == 1 {
        return groups.into_iter().next();
    }
    groups
        .into_iter()
        .map(Expr::paren)
        .reduce(Expr::and)
}

/// Left fold over the contributing conditions of one group.
///
/// The join between the accumulated expression and the next condition is
/// the operator of the previous contributing condition.
fn group_expr(group: &ConditionGroup, scope: &Scope) -> Option<Expr> {
    let mut acc: Option<(Expr, LogicOp)> = None;
    let mut contributed = 0_usize;

    for condition in &group.conditions {
        let Some(expr) = condition_atom(condition, scope) else {
            continue;
        };
        contributed += 1;
        acc = Some(match acc {
            None => (expr, condition.operator),
            Some((prev, join)) => (prev.join(join, expr), condition.operator),
        });
    }

    acc.map(|(expr, _)| if contributed > 1 { expr.paren() } else { expr })
}

/// One condition with its negation applied.
fn condition_atom(condition: &Condition, scope: &Scope) -> Option<Expr> {
    let expr = lower(&condition.kind, scope)?;
    Some(if condition.negate { !expr } else { expr })
}

fn lower(kind: &ConditionKind, scope: &Scope) -> Option<Expr> {
    let text = match kind {
        ConditionKind::HandType(p) => hand_type(p, scope)?,
        ConditionKind::CardRank(test) => card_rank(*test),
        ConditionKind::CardSuit(test) => card_suit(*test),
        ConditionKind::CardEnhancement(key) => match key {
            Some(key) => format!("SMODS.has_enhancement(card, {})", lua_string(key)),
            None => "next(SMODS.get_enhancements(card))".to_owned(),
        },
        ConditionKind::CardSeal(seal) => match seal {
            Some(seal) => format!("card.seal == {}", lua_string(seal)),
            None => "card.seal ~= nil".to_owned(),
        },
        ConditionKind::CardEdition(edition) => match edition {
            Some(edition) => format!(
                "(card.edition and card.edition.key == {})",
                lua_string(edition)
            ),
            None => "card.edition ~= nil".to_owned(),
        },
        ConditionKind::CardDebuffed => "card.debuff".to_owned(),
        ConditionKind::PlayerMoney(p) => game_compare(GameVar::Money, p, scope),
        ConditionKind::RemainingHands(p) => game_compare(GameVar::HandsLeft, p, scope),
        ConditionKind::RemainingDiscards(p) => game_compare(GameVar::DiscardsLeft, p, scope),
        ConditionKind::HandSize(p) => game_compare(GameVar::HandSize, p, scope),
        ConditionKind::DeckSize { source, compare } => {
            let var = match source {
                DeckSource::Remaining => GameVar::DeckRemaining,
                DeckSource::Total => GameVar::DeckTotal,
            };
            game_compare(var, compare, scope)
        }
        ConditionKind::JokerCount(p) => game_compare(GameVar::JokerCount, p, scope),
        ConditionKind::ConsumableCount(p) => game_compare(GameVar::ConsumableCount, p, scope),
        ConditionKind::AnteLevel(p) => game_compare(GameVar::Ante, p, scope),
        ConditionKind::RoundNumber(p) => game_compare(GameVar::Round, p, scope),
        ConditionKind::BlindType(blind) => match blind {
            BlindKind::Small => "G.GAME.blind:get_type() == \"Small\"".to_owned(),
            BlindKind::Big => "G.GAME.blind:get_type() == \"Big\"".to_owned(),
            BlindKind::Boss => "G.GAME.blind.boss".to_owned(),
        },
        ConditionKind::FirstHand => "G.GAME.current_round.hands_played == 0".to_owned(),
        ConditionKind::PlayedCardCount(p) => {
            if !scope.trigger().is_main_scoring() {
                debug!(trigger = %scope.trigger(), "played_card_count outside scoring; dropped");
                return None;
            }
            compare("#context.full_hand", p.operator, &p.value, scope)
        }
        ConditionKind::CardPosition(slot) => {
            if *scope.trigger() != TriggerId::CardScored {
                debug!(trigger = %scope.trigger(), "card_position outside card_scored; dropped");
                return None;
            }
            match slot {
                CardSlot::First => "context.scoring_hand[1] == card".to_owned(),
                CardSlot::Last => "context.scoring_hand[#context.scoring_hand] == card".to_owned(),
                CardSlot::Index(i) => format!("context.scoring_hand[{i}] == card"),
            }
        }
        ConditionKind::InternalVariable(p) => {
            let Some(variable) = p.variable.as_deref().filter(|v| is_identifier(v)) else {
                debug!(variable = ?p.variable, "internal_variable without a valid variable; dropped");
                return None;
            };
            let lhs = format!("{}.{variable}", scope.ability());
            compare(&lhs, p.operator, &p.value, scope)
        }
        ConditionKind::HasJoker(key) => match key {
            Some(key) => format!("next(SMODS.find_card({}))", lua_string(key)),
            None => "#G.jokers.cards > 0".to_owned(),
        },
        ConditionKind::EnhancementCount(p) => enhancement_count(p, scope),
        ConditionKind::GenericCompare(p) => {
            let lhs = inline_amount(&p.left, scope, "compare");
            compare(&lhs, p.operator, &p.right, scope)
        }
        ConditionKind::Unknown(id) => {
            debug!(condition = %id, "unknown condition kind; dropped");
            return None;
        }
    };
    Some(Expr::atom(text))
}

fn compare(lhs: &str, op: CompareOp, rhs: &Amount, scope: &Scope) -> String {
    format!("{lhs} {op} {}", inline_amount(rhs, scope, "compare"))
}

fn game_compare(var: GameVar, p: &CompareParams, scope: &Scope) -> String {
    compare(var.lua(), p.operator, &p.value, scope)
}

fn hand_type(p: &HandTypeParams, scope: &Scope) -> Option<String> {
    if *scope.trigger() != TriggerId::CardScored {
        debug!(trigger = %scope.trigger(), "hand_type outside card_scored; dropped");
        return None;
    }
    let hand = lua_string(&p.hand);
    let source = match p.scope {
        HandScope::Scoring => "context.scoring_name",
        HandScope::LastPlayed => "G.GAME.last_hand_played",
    };
    Some(match p.matching {
        // Tests the hands contained in the scoring hand regardless of scope.
        HandMatch::Contains => format!("next(context.poker_hands[{hand}])"),
        HandMatch::Equals => format!("{source} == {hand}"),
        HandMatch::NotEquals => format!("{source} ~= {hand}"),
    })
}

fn card_rank(test: RankTest) -> String {
    match test {
        RankTest::Specific { operator, rank } => {
            format!("card:get_id() {operator} {}", rank.runtime_id())
        }
        RankTest::Group(RankGroup::Face) => "card:is_face()".to_owned(),
        RankTest::Group(RankGroup::Even) => {
            "(card:get_id() <= 10 and card:get_id() % 2 == 0)".to_owned()
        }
        RankTest::Group(RankGroup::Odd) => {
            "(card:get_id() == 14 or (card:get_id() <= 10 and card:get_id() % 2 == 1))".to_owned()
        }
    }
}

fn card_suit(test: SuitTest) -> String {
    let either = |a: &str, b: &str| format!("(card:is_suit(\"{a}\") or card:is_suit(\"{b}\"))");
    match test {
        SuitTest::Specific(suit) => format!("card:is_suit(\"{}\")", suit.name()),
        SuitTest::Group(SuitGroup::Red) => either("Hearts", "Diamonds"),
        SuitTest::Group(SuitGroup::Black) => either("Spades", "Clubs"),
    }
}

fn enhancement_count(p: &EnhancementCountParams, scope: &Scope) -> String {
    let test = match &p.enhancement {
        Some(key) => format!("SMODS.has_enhancement(c, {})", lua_string(key)),
        None => "next(SMODS.get_enhancements(c))".to_owned(),
    };
    let counter = format!(
        "(function() local count = 0 for _, c in ipairs(G.playing_cards) do if {test} then count = count + 1 end end return count end)()"
    );
    compare(&counter, p.operator, &p.value, scope)
}
