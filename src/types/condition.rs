use super::card::{Rank, Suit};
use super::expr::CompareOp;
use super::params::{Choice, Params};
use super::value::Amount;

/// How a hand-type condition matches the poker hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandMatch {
    /// The played hand contains the shape (a Full House contains a Pair).
    Contains,
    #[default]
    Equals,
    NotEquals,
}

impl Choice for HandMatch {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "contains" => Some(HandMatch::Contains),
            "equals" => Some(HandMatch::Equals),
            "not_equals" => Some(HandMatch::NotEquals),
            _ => None,
        }
    }
}

/// Which hand name an `equals`/`not_equals` hand-type test reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandScope {
    #[default]
    Scoring,
    LastPlayed,
}

impl Choice for HandScope {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "scoring" => Some(HandScope::Scoring),
            "last_played" => Some(HandScope::LastPlayed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandTypeParams {
    pub matching: HandMatch,
    pub hand: String,
    pub scope: HandScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankGroup {
    #[default]
    Face,
    Even,
    Odd,
}

impl Choice for RankGroup {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "face" => Some(RankGroup::Face),
            "even" => Some(RankGroup::Even),
            "odd" => Some(RankGroup::Odd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTest {
    Specific { operator: CompareOp, rank: Rank },
    Group(RankGroup),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuitGroup {
    #[default]
    Red,
    Black,
}

impl Choice for SuitGroup {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "red" => Some(SuitGroup::Red),
            "black" => Some(SuitGroup::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitTest {
    Specific(Suit),
    Group(SuitGroup),
}

/// A numeric comparison against a value; the default value is kind-specific.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareParams {
    pub operator: CompareOp,
    pub value: Amount,
}

impl CompareParams {
    #[must_use]
    pub fn new(operator: CompareOp, value: impl Into<Amount>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }

    fn read(params: &Params, default: f64) -> Self {
        Self {
            operator: params.choice("operator"),
            value: params.amount_or("value", default),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeckSource {
    #[default]
    Remaining,
    Total,
}

impl Choice for DeckSource {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "remaining" => Some(DeckSource::Remaining),
            "total" => Some(DeckSource::Total),
            _ => None,
        }
    }
}

impl DeckSource {
    #[must_use]
    pub fn default_size(self) -> f64 {
        match self {
            DeckSource::Remaining => 25.0,
            DeckSource::Total => 52.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlindKind {
    #[default]
    Small,
    Big,
    Boss,
}

impl Choice for BlindKind {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "small" => Some(BlindKind::Small),
            "big" => Some(BlindKind::Big),
            "boss" => Some(BlindKind::Boss),
            _ => None,
        }
    }
}

/// Position of this card within the scoring hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSlot {
    First,
    Last,
    /// 1-based index.
    Index(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableCompareParams {
    pub variable: Option<String>,
    pub operator: CompareOp,
    pub value: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementCountParams {
    /// `None` counts cards with any enhancement.
    pub enhancement: Option<String>,
    pub operator: CompareOp,
    pub value: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericCompareParams {
    pub left: Amount,
    pub operator: CompareOp,
    pub right: Amount,
}

/// Every condition kind the compiler lowers, with typed parameters.
///
/// `Option<String>` keys use `None` for "any".
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    HandType(HandTypeParams),
    CardRank(RankTest),
    CardSuit(SuitTest),
    CardEnhancement(Option<String>),
    CardSeal(Option<String>),
    CardEdition(Option<String>),
    CardDebuffed,
    PlayerMoney(CompareParams),
    RemainingHands(CompareParams),
    RemainingDiscards(CompareParams),
    HandSize(CompareParams),
    DeckSize {
        source: DeckSource,
        compare: CompareParams,
    },
    JokerCount(CompareParams),
    ConsumableCount(CompareParams),
    AnteLevel(CompareParams),
    RoundNumber(CompareParams),
    BlindType(BlindKind),
    FirstHand,
    PlayedCardCount(CompareParams),
    CardPosition(CardSlot),
    InternalVariable(VariableCompareParams),
    HasJoker(Option<String>),
    EnhancementCount(EnhancementCountParams),
    GenericCompare(GenericCompareParams),
    /// A condition id this compiler does not know; lowers to nothing.
    Unknown(String),
}

impl ConditionKind {
    /// Build a typed condition from its catalog id and the editor's parameter bag.
    #[must_use]
    pub fn from_params(id: &str, params: &Params) -> Self {
        match id {
            "hand_type" => ConditionKind::HandType(HandTypeParams {
                matching: params.choice("operator"),
                hand: params.text("value").unwrap_or("Pair").to_owned(),
                scope: params.choice("scope"),
            }),
            "card_rank" => ConditionKind::CardRank(match params.text("rank_type") {
                Some("group") => RankTest::Group(params.choice("rank_group")),
                _ => RankTest::Specific {
                    operator: params.choice("operator"),
                    rank: params.choice("specific_rank"),
                },
            }),
            "card_suit" => ConditionKind::CardSuit(match params.text("suit_type") {
                Some("group") => SuitTest::Group(params.choice("suit_group")),
                _ => SuitTest::Specific(params.choice("specific_suit")),
            }),
            "card_enhancement" => {
                ConditionKind::CardEnhancement(params.key_or_wildcard("enhancement"))
            }
            "card_seal" => ConditionKind::CardSeal(params.key_or_wildcard("seal")),
            "card_edition" => ConditionKind::CardEdition(params.key_or_wildcard("edition")),
            "card_debuffed" => ConditionKind::CardDebuffed,
            "player_money" => ConditionKind::PlayerMoney(CompareParams::read(params, 5.0)),
            "remaining_hands" => ConditionKind::RemainingHands(CompareParams::read(params, 1.0)),
            "remaining_discards" => {
                ConditionKind::RemainingDiscards(CompareParams::read(params, 1.0))
            }
            "hand_size" => ConditionKind::HandSize(CompareParams::read(params, 8.0)),
            "deck_size" => {
                let source: DeckSource = params.choice("size_type");
                ConditionKind::DeckSize {
                    source,
                    compare: CompareParams::read(params, source.default_size()),
                }
            }
            "joker_count" => ConditionKind::JokerCount(CompareParams::read(params, 1.0)),
            "consumable_count" => ConditionKind::ConsumableCount(CompareParams::read(params, 1.0)),
            "ante_level" => ConditionKind::AnteLevel(CompareParams::read(params, 1.0)),
            "round_number" => ConditionKind::RoundNumber(CompareParams::read(params, 1.0)),
            "blind_type" => ConditionKind::BlindType(params.choice("blind_type")),
            "first_hand" => ConditionKind::FirstHand,
            "played_card_count" => {
                ConditionKind::PlayedCardCount(CompareParams::read(params, 5.0))
            }
            "card_position" => ConditionKind::CardPosition(match params.text("position") {
                Some("last") => CardSlot::Last,
                Some("specific") => {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let index = params.number_or("index", 1.0).max(1.0) as u32;
                    CardSlot::Index(index)
                }
                _ => CardSlot::First,
            }),
            "internal_variable" => ConditionKind::InternalVariable(VariableCompareParams {
                variable: params.text("variable").map(str::to_owned),
                operator: params.choice("operator"),
                value: params.amount_or("value", 0.0),
            }),
            "has_joker" => ConditionKind::HasJoker(params.key_or_wildcard("joker_key")),
            "enhancement_count" => ConditionKind::EnhancementCount(EnhancementCountParams {
                enhancement: params.key_or_wildcard("enhancement"),
                operator: params.choice("operator"),
                value: params.amount_or("value", 1.0),
            }),
            "generic_compare" => ConditionKind::GenericCompare(GenericCompareParams {
                left: params.amount_or("value1", 0.0),
                operator: params.choice("operator"),
                right: params.amount_or("value2", 0.0),
            }),
            other => ConditionKind::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            ConditionKind::HandType(_) => "hand_type",
            ConditionKind::CardRank(_) => "card_rank",
            ConditionKind::CardSuit(_) => "card_suit",
            ConditionKind::CardEnhancement(_) => "card_enhancement",
            ConditionKind::CardSeal(_) => "card_seal",
            ConditionKind::CardEdition(_) => "card_edition",
            ConditionKind::CardDebuffed => "card_debuffed",
            ConditionKind::PlayerMoney(_) => "player_money",
            ConditionKind::RemainingHands(_) => "remaining_hands",
            ConditionKind::RemainingDiscards(_) => "remaining_discards",
            ConditionKind::HandSize(_) => "hand_size",
            ConditionKind::DeckSize { .. } => "deck_size",
            ConditionKind::JokerCount(_) => "joker_count",
            ConditionKind::ConsumableCount(_) => "consumable_count",
            ConditionKind::AnteLevel(_) => "ante_level",
            ConditionKind::RoundNumber(_) => "round_number",
            ConditionKind::BlindType(_) => "blind_type",
            ConditionKind::FirstHand => "first_hand",
            ConditionKind::PlayedCardCount(_) => "played_card_count",
            ConditionKind::CardPosition(_) => "card_position",
            ConditionKind::InternalVariable(_) => "internal_variable",
            ConditionKind::HasJoker(_) => "has_joker",
            ConditionKind::EnhancementCount(_) => "enhancement_count",
            ConditionKind::GenericCompare(_) => "generic_compare",
            ConditionKind::Unknown(id) => id,
        }
    }

    /// Every numeric amount this condition reads.
    #[must_use]
    pub fn amounts(&self) -> Vec<&Amount> {
        match self {
            ConditionKind::PlayerMoney(p)
            | ConditionKind::RemainingHands(p)
            | ConditionKind::RemainingDiscards(p)
            | ConditionKind::HandSize(p)
            | ConditionKind::JokerCount(p)
            | ConditionKind::ConsumableCount(p)
            | ConditionKind::AnteLevel(p)
            | ConditionKind::RoundNumber(p)
            | ConditionKind::PlayedCardCount(p) => vec![&p.value],
            ConditionKind::DeckSize { compare, .. } => vec![&compare.value],
            ConditionKind::InternalVariable(p) => vec![&p.value],
            ConditionKind::EnhancementCount(p) => vec![&p.value],
            ConditionKind::GenericCompare(p) => vec![&p.left, &p.right],
            _ => Vec::new(),
        }
    }

    /// The user variable this condition tests, if any.
    #[must_use]
    pub fn target_variable(&self) -> Option<&str> {
        match self {
            ConditionKind::InternalVariable(p) => p.variable.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::GameVar;

    #[test]
    fn unknown_id_is_kept() {
        let kind = ConditionKind::from_params("moon_phase", &Params::new());
        assert_eq!(kind, ConditionKind::Unknown("moon_phase".into()));
        assert_eq!(kind.id(), "moon_phase");
    }

    #[test]
    fn compare_defaults_are_kind_specific() {
        let empty = Params::new();
        match ConditionKind::from_params("player_money", &empty) {
            ConditionKind::PlayerMoney(p) => {
                assert_eq!(p.operator, CompareOp::Eq);
                assert_eq!(p.value, Amount::Literal(5.0));
            }
            other => panic!("expected PlayerMoney, got {other:?}"),
        }
        match ConditionKind::from_params("deck_size", &Params::new().set("size_type", "total")) {
            ConditionKind::DeckSize { source, compare } => {
                assert_eq!(source, DeckSource::Total);
                assert_eq!(compare.value, Amount::Literal(52.0));
            }
            other => panic!("expected DeckSize, got {other:?}"),
        }
        match ConditionKind::from_params("deck_size", &empty) {
            ConditionKind::DeckSize { compare, .. } => {
                assert_eq!(compare.value, Amount::Literal(25.0));
            }
            other => panic!("expected DeckSize, got {other:?}"),
        }
    }

    #[test]
    fn malformed_value_falls_back() {
        let params = Params::new()
            .set("operator", "greater_than")
            .set("value", "lots");
        match ConditionKind::from_params("hand_size", &params) {
            ConditionKind::HandSize(p) => {
                assert_eq!(p.operator, CompareOp::Gt);
                assert_eq!(p.value, Amount::Literal(8.0));
            }
            other => panic!("expected HandSize, got {other:?}"),
        }
    }

    #[test]
    fn rank_and_suit_variants() {
        let rank = ConditionKind::from_params(
            "card_rank",
            &Params::new().set("rank_type", "group").set("rank_group", "even"),
        );
        assert_eq!(rank, ConditionKind::CardRank(RankTest::Group(RankGroup::Even)));

        let suit = ConditionKind::from_params(
            "card_suit",
            &Params::new().set("specific_suit", "Hearts"),
        );
        assert_eq!(suit, ConditionKind::CardSuit(SuitTest::Specific(Suit::Hearts)));
    }

    #[test]
    fn card_position_index_is_clamped() {
        let kind = ConditionKind::from_params(
            "card_position",
            &Params::new().set("position", "specific").set("index", -3_i64),
        );
        assert_eq!(kind, ConditionKind::CardPosition(CardSlot::Index(1)));
    }

    #[test]
    fn generic_compare_reads_game_vars() {
        let kind = ConditionKind::from_params(
            "generic_compare",
            &Params::new()
                .set("value1", "GAMEVAR:ante")
                .set("operator", "less_than")
                .set("value2", 4_i64),
        );
        assert_eq!(
            kind,
            ConditionKind::GenericCompare(GenericCompareParams {
                left: Amount::game_var(GameVar::Ante),
                operator: CompareOp::Lt,
                right: Amount::Literal(4.0),
            })
        );
    }
}
