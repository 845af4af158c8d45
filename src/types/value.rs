use std::fmt;
use std::str::FromStr;

use crate::parse::ParseError;

/// A raw parameter value as stored by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A numeric value.
    Number(f64),
    /// A UTF-8 string; may hold a number or an amount reference in text form.
    Text(String),
    /// A boolean value.
    Bool(bool),
}

impl ParamValue {
    /// The value as text. Numbers and booleans are not converted.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The value as a finite number. Text is parsed leniently.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            ParamValue::Number(n) => *n,
            ParamValue::Text(s) => s.trim().parse().ok()?,
            ParamValue::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Text(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            ParamValue::Number(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i64> for ParamValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Game state that an [`Amount`] can read at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameVar {
    Money,
    HandsLeft,
    DiscardsLeft,
    HandsPlayed,
    HandSize,
    DeckRemaining,
    DeckTotal,
    JokerCount,
    ConsumableCount,
    Ante,
    Round,
    Skips,
}

impl GameVar {
    pub const ALL: [GameVar; 12] = [
        GameVar::Money,
        GameVar::HandsLeft,
        GameVar::DiscardsLeft,
        GameVar::HandsPlayed,
        GameVar::HandSize,
        GameVar::DeckRemaining,
        GameVar::DeckTotal,
        GameVar::JokerCount,
        GameVar::ConsumableCount,
        GameVar::Ante,
        GameVar::Round,
        GameVar::Skips,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            GameVar::Money => "money",
            GameVar::HandsLeft => "hands_left",
            GameVar::DiscardsLeft => "discards_left",
            GameVar::HandsPlayed => "hands_played",
            GameVar::HandSize => "hand_size",
            GameVar::DeckRemaining => "deck_remaining",
            GameVar::DeckTotal => "deck_total",
            GameVar::JokerCount => "joker_count",
            GameVar::ConsumableCount => "consumable_count",
            GameVar::Ante => "ante",
            GameVar::Round => "round",
            GameVar::Skips => "skips",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.id() == id)
    }

    /// The Lua expression reading this value.
    #[must_use]
    pub fn lua(self) -> &'static str {
        match self {
            GameVar::Money => "G.GAME.dollars",
            GameVar::HandsLeft => "G.GAME.current_round.hands_left",
            GameVar::DiscardsLeft => "G.GAME.current_round.discards_left",
            GameVar::HandsPlayed => "G.GAME.current_round.hands_played",
            GameVar::HandSize => "G.hand.config.card_limit",
            GameVar::DeckRemaining => "#G.deck.cards",
            GameVar::DeckTotal => "#G.playing_cards",
            GameVar::JokerCount => "#G.jokers.cards",
            GameVar::ConsumableCount => "#G.consumeables.cards",
            GameVar::Ante => "G.GAME.round_resets.ante",
            GameVar::Round => "G.GAME.round",
            GameVar::Skips => "G.GAME.skips",
        }
    }
}

/// A numeric parameter: either a literal or a reference resolved at runtime.
///
/// The text form accepted by [`FromStr`] is the one the editor stores:
///
/// | text                  | amount                                   |
/// |-----------------------|------------------------------------------|
/// | `30`, `-1.5`          | [`Amount::Literal`]                      |
/// | `GAMEVAR:money`       | [`Amount::GameVar`], multiplier 1, offset 0 |
/// | `GAMEVAR:money\|2\|5` | [`Amount::GameVar`] with multiplier and offset |
/// | `RANGE:1\|5`          | [`Amount::Range`]                        |
/// | `counter`             | [`Amount::Variable`]                     |
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Literal(f64),
    GameVar {
        var: GameVar,
        multiplier: f64,
        offset: f64,
    },
    /// A user variable declared on the unit.
    Variable(String),
    /// A uniformly random integer in `min..=max`.
    Range { min: i64, max: i64 },
}

impl Amount {
    #[must_use]
    pub fn literal(&self) -> Option<f64> {
        match self {
            Amount::Literal(v) => Some(*v),
            _ => None,
        }
    }

    /// The user variable this amount reads, if any.
    #[must_use]
    pub fn variable(&self) -> Option<&str> {
        match self {
            Amount::Variable(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn game_var(var: GameVar) -> Self {
        Amount::GameVar {
            var,
            multiplier: 1.0,
            offset: 0.0,
        }
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Literal(v)
    }
}

impl From<i64> for Amount {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Amount::Literal(v as f64)
    }
}

impl FromStr for Amount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_amount(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Literal(v) => write!(f, "{v}"),
            Amount::GameVar {
                var,
                multiplier,
                offset,
            } => {
                write!(f, "GAMEVAR:{}", var.id())?;
                if *multiplier != 1.0 || *offset != 0.0 {
                    write!(f, "|{multiplier}|{offset}")?;
                }
                Ok(())
            }
            Amount::Variable(name) => write!(f, "{name}"),
            Amount::Range { min, max } => write!(f, "RANGE:{min}|{max}"),
        }
    }
}
