use std::fmt;

/// The runtime phase a rule is evaluated in.
///
/// Ids outside the known set are kept as [`TriggerId::Unknown`] so save data
/// written by a newer editor still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerId {
    CardScored,
    CardHeld,
    CardHeldEndOfRound,
    CardDiscarded,
    Unknown(String),
}

impl TriggerId {
    pub const KNOWN: [TriggerId; 4] = [
        TriggerId::CardScored,
        TriggerId::CardHeld,
        TriggerId::CardHeldEndOfRound,
        TriggerId::CardDiscarded,
    ];

    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            "card_scored" => TriggerId::CardScored,
            "card_held" => TriggerId::CardHeld,
            "card_held_end_of_round" => TriggerId::CardHeldEndOfRound,
            "card_discarded" => TriggerId::CardDiscarded,
            other => TriggerId::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            TriggerId::CardScored => "card_scored",
            TriggerId::CardHeld => "card_held",
            TriggerId::CardHeldEndOfRound => "card_held_end_of_round",
            TriggerId::CardDiscarded => "card_discarded",
            TriggerId::Unknown(id) => id,
        }
    }

    /// True for triggers that run while a played hand is being scored.
    #[must_use]
    pub fn is_main_scoring(&self) -> bool {
        matches!(self, TriggerId::CardScored | TriggerId::CardHeld)
    }
}

impl From<&str> for TriggerId {
    fn from(id: &str) -> Self {
        TriggerId::from_id(id)
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
