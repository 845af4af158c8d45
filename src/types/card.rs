//! Playing-card vocabulary shared by conditions and effects.

use std::fmt;

use super::params::Choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Suit {
    #[default]
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Hearts => "Hearts",
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
        }
    }
}

impl Choice for Suit {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "Spades" | "spades" => Some(Suit::Spades),
            "Hearts" | "hearts" => Some(Suit::Hearts),
            "Clubs" | "clubs" => Some(Suit::Clubs),
            "Diamonds" | "diamonds" => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A card rank, stored as the id the runtime reports from `card:get_id()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(14);
    pub const KING: Rank = Rank(13);
    pub const QUEEN: Rank = Rank(12);
    pub const JACK: Rank = Rank(11);

    /// Build a rank from its runtime id (2-14).
    #[must_use]
    pub fn from_runtime_id(id: u8) -> Option<Self> {
        (2..=14).contains(&id).then_some(Rank(id))
    }

    #[must_use]
    pub fn runtime_id(self) -> u8 {
        self.0
    }

    /// The base-card name used by `SMODS.change_base`.
    #[must_use]
    pub fn name(self) -> String {
        match self.0 {
            14 => "Ace".to_owned(),
            13 => "King".to_owned(),
            12 => "Queen".to_owned(),
            11 => "Jack".to_owned(),
            n => n.to_string(),
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::ACE
    }
}

impl Choice for Rank {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "A" | "Ace" | "ace" => Some(Rank::ACE),
            "K" | "King" | "king" => Some(Rank::KING),
            "Q" | "Queen" | "queen" => Some(Rank::QUEEN),
            "J" | "Jack" | "jack" => Some(Rank::JACK),
            other => other.parse().ok().and_then(Rank::from_runtime_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ids() {
        assert_eq!(Rank::from_id("A"), Some(Rank::ACE));
        assert_eq!(Rank::from_id("10").map(Rank::runtime_id), Some(10));
        assert_eq!(Rank::from_id("1"), None);
        assert_eq!(Rank::from_id("15"), None);
        assert_eq!(Rank::JACK.name(), "Jack");
        assert_eq!(Rank::from_id("7").unwrap().name(), "7");
    }

    #[test]
    fn suit_ids_accept_either_case() {
        assert_eq!(Suit::from_id("hearts"), Some(Suit::Hearts));
        assert_eq!(Suit::from_id("Diamonds"), Some(Suit::Diamonds));
        assert_eq!(Suit::from_id("stars"), None);
    }
}
