use std::fmt;

use super::card::{Rank, Suit};
use super::params::{Choice, Params};
use super::value::Amount;

/// A runtime colour constant used for effect messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colour {
    Chips,
    Mult,
    XMult,
    Money,
    Red,
    Blue,
    Orange,
    Purple,
    Green,
    #[default]
    White,
    Tarot,
    Planet,
    Spectral,
}

impl Choice for Colour {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "chips" => Some(Colour::Chips),
            "mult" => Some(Colour::Mult),
            "xmult" => Some(Colour::XMult),
            "money" => Some(Colour::Money),
            "red" => Some(Colour::Red),
            "blue" => Some(Colour::Blue),
            "orange" => Some(Colour::Orange),
            "purple" => Some(Colour::Purple),
            "green" => Some(Colour::Green),
            "white" => Some(Colour::White),
            "tarot" => Some(Colour::Tarot),
            "planet" => Some(Colour::Planet),
            "spectral" => Some(Colour::Spectral),
            _ => None,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Colour::Chips => "G.C.CHIPS",
            Colour::Mult => "G.C.MULT",
            Colour::XMult => "G.C.XMULT",
            Colour::Money => "G.C.MONEY",
            Colour::Red => "G.C.RED",
            Colour::Blue => "G.C.BLUE",
            Colour::Orange => "G.C.ORANGE",
            Colour::Purple => "G.C.PURPLE",
            Colour::Green => "G.C.GREEN",
            Colour::White => "G.C.WHITE",
            Colour::Tarot => "G.C.SECONDARY_SET.Tarot",
            Colour::Planet => "G.C.SECONDARY_SET.Planet",
            Colour::Spectral => "G.C.SECONDARY_SET.Spectral",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditOp {
    #[default]
    Add,
    Subtract,
    Set,
}

impl Choice for EditOp {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "add" => Some(EditOp::Add),
            "subtract" => Some(EditOp::Subtract),
            "set" => Some(EditOp::Set),
            _ => None,
        }
    }
}

/// Add to, subtract from, or set a game counter.
#[derive(Debug, Clone, PartialEq)]
pub struct EditParams {
    pub operation: EditOp,
    pub value: Amount,
}

impl EditParams {
    #[must_use]
    pub fn new(operation: EditOp, value: impl Into<Amount>) -> Self {
        Self {
            operation,
            value: value.into(),
        }
    }

    fn read(params: &Params) -> Self {
        Self {
            operation: params.choice("operation"),
            value: params.amount_or("value", 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelUpParams {
    /// `None` levels up the hand being scored.
    pub hand: Option<String>,
    pub levels: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumableSet {
    #[default]
    Tarot,
    Planet,
    Spectral,
}

impl ConsumableSet {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ConsumableSet::Tarot => "Tarot",
            ConsumableSet::Planet => "Planet",
            ConsumableSet::Spectral => "Spectral",
        }
    }

    #[must_use]
    pub fn colour(self) -> Colour {
        match self {
            ConsumableSet::Tarot => Colour::Tarot,
            ConsumableSet::Planet => Colour::Planet,
            ConsumableSet::Spectral => Colour::Spectral,
        }
    }
}

impl Choice for ConsumableSet {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "tarot" | "Tarot" => Some(ConsumableSet::Tarot),
            "planet" | "Planet" => Some(ConsumableSet::Planet),
            "spectral" | "Spectral" => Some(ConsumableSet::Spectral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumableParams {
    pub set: ConsumableSet,
    /// `None` creates a random card of the set.
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        match id {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JokerSpawnParams {
    /// A specific joker key; takes precedence over `rarity`.
    pub key: Option<String>,
    pub rarity: Option<Rarity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyTarget {
    #[default]
    Deck,
    Hand,
}

impl Choice for CopyTarget {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "deck" => Some(CopyTarget::Deck),
            "hand" => Some(CopyTarget::Hand),
            _ => None,
        }
    }
}

/// Changes applied to this card; `None` leaves the property untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditCardParams {
    pub suit: Option<Suit>,
    pub rank: Option<Rank>,
    pub enhancement: Option<String>,
    pub seal: Option<String>,
    pub edition: Option<String>,
}

impl EditCardParams {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarOp {
    #[default]
    Set,
    Increment,
    Decrement,
    Multiply,
    Divide,
}

impl Choice for VarOp {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "set" => Some(VarOp::Set),
            "increment" => Some(VarOp::Increment),
            "decrement" => Some(VarOp::Decrement),
            "multiply" => Some(VarOp::Multiply),
            "divide" => Some(VarOp::Divide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyVariableParams {
    pub variable: Option<String>,
    pub operation: VarOp,
    pub value: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageParams {
    pub text: String,
    pub colour: Colour,
}

/// Every effect kind the compiler lowers, with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    AddChips(Amount),
    AddMult(Amount),
    ApplyXMult(Amount),
    ApplyXChips(Amount),
    AddDollars(Amount),
    Retrigger(Amount),
    DestroyCard,
    LevelUpHand(LevelUpParams),
    EditHandSize(EditParams),
    EditHands(EditParams),
    EditDiscards(EditParams),
    EditDollars(EditParams),
    CreateConsumable(ConsumableParams),
    CreateJoker(JokerSpawnParams),
    CopyCard(CopyTarget),
    EditCard(EditCardParams),
    ModifyVariable(ModifyVariableParams),
    Balance,
    SwapChipsMult,
    ShowMessage(MessageParams),
    /// An effect id this compiler does not know; lowers to nothing.
    Unknown(String),
}

impl EffectKind {
    /// Build a typed effect from its catalog id and the editor's parameter bag.
    #[must_use]
    pub fn from_params(id: &str, params: &Params) -> Self {
        match id {
            "add_chips" => EffectKind::AddChips(params.amount_or("value", 10.0)),
            "add_mult" => EffectKind::AddMult(params.amount_or("value", 5.0)),
            "apply_x_mult" => EffectKind::ApplyXMult(params.amount_or("value", 1.5)),
            "apply_x_chips" => EffectKind::ApplyXChips(params.amount_or("value", 1.5)),
            "add_dollars" => EffectKind::AddDollars(params.amount_or("value", 5.0)),
            "retrigger" => EffectKind::Retrigger(params.amount_or("value", 1.0)),
            "destroy_card" => EffectKind::DestroyCard,
            "level_up_hand" => EffectKind::LevelUpHand(LevelUpParams {
                hand: match params.text("hand_selection") {
                    Some("specific") => params.text("specific_hand").map(str::to_owned),
                    _ => None,
                },
                levels: params.amount_or("value", 1.0),
            }),
            "edit_hand_size" => EffectKind::EditHandSize(EditParams::read(params)),
            "edit_hands" => EffectKind::EditHands(EditParams::read(params)),
            "edit_discards" => EffectKind::EditDiscards(EditParams::read(params)),
            "edit_dollars" => EffectKind::EditDollars(EditParams::read(params)),
            "create_consumable" => EffectKind::CreateConsumable(ConsumableParams {
                set: params.choice("set"),
                key: params.key_or_wildcard("specific_card"),
            }),
            "create_joker" => EffectKind::CreateJoker(JokerSpawnParams {
                key: params.key_or_wildcard("joker_key"),
                rarity: params.text("rarity").and_then(Rarity::from_id),
            }),
            "copy_card" => EffectKind::CopyCard(params.choice("destination")),
            "edit_card" => EffectKind::EditCard(EditCardParams {
                suit: params
                    .key_or_wildcard("new_suit")
                    .and_then(|s| Suit::from_id(&s)),
                rank: params
                    .key_or_wildcard("new_rank")
                    .and_then(|r| Rank::from_id(&r)),
                enhancement: params.key_or_wildcard("new_enhancement"),
                seal: params.key_or_wildcard("new_seal"),
                edition: params.key_or_wildcard("new_edition"),
            }),
            "modify_variable" => EffectKind::ModifyVariable(ModifyVariableParams {
                variable: params.text("variable").map(str::to_owned),
                operation: params.choice("operation"),
                value: params.amount_or("value", 1.0),
            }),
            "balance" => EffectKind::Balance,
            "swap_chips_mult" => EffectKind::SwapChipsMult,
            "show_message" => EffectKind::ShowMessage(MessageParams {
                text: params.text("text").unwrap_or_default().to_owned(),
                colour: params.choice("colour"),
            }),
            other => EffectKind::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            EffectKind::AddChips(_) => "add_chips",
            EffectKind::AddMult(_) => "add_mult",
            EffectKind::ApplyXMult(_) => "apply_x_mult",
            EffectKind::ApplyXChips(_) => "apply_x_chips",
            EffectKind::AddDollars(_) => "add_dollars",
            EffectKind::Retrigger(_) => "retrigger",
            EffectKind::DestroyCard => "destroy_card",
            EffectKind::LevelUpHand(_) => "level_up_hand",
            EffectKind::EditHandSize(_) => "edit_hand_size",
            EffectKind::EditHands(_) => "edit_hands",
            EffectKind::EditDiscards(_) => "edit_discards",
            EffectKind::EditDollars(_) => "edit_dollars",
            EffectKind::CreateConsumable(_) => "create_consumable",
            EffectKind::CreateJoker(_) => "create_joker",
            EffectKind::CopyCard(_) => "copy_card",
            EffectKind::EditCard(_) => "edit_card",
            EffectKind::ModifyVariable(_) => "modify_variable",
            EffectKind::Balance => "balance",
            EffectKind::SwapChipsMult => "swap_chips_mult",
            EffectKind::ShowMessage(_) => "show_message",
            EffectKind::Unknown(id) => id,
        }
    }

    /// Every numeric amount this effect reads.
    #[must_use]
    pub fn amounts(&self) -> Vec<&Amount> {
        match self {
            EffectKind::AddChips(v)
            | EffectKind::AddMult(v)
            | EffectKind::ApplyXMult(v)
            | EffectKind::ApplyXChips(v)
            | EffectKind::AddDollars(v)
            | EffectKind::Retrigger(v) => vec![v],
            EffectKind::LevelUpHand(p) => vec![&p.levels],
            EffectKind::EditHandSize(p)
            | EffectKind::EditHands(p)
            | EffectKind::EditDiscards(p)
            | EffectKind::EditDollars(p) => vec![&p.value],
            EffectKind::ModifyVariable(p) => vec![&p.value],
            _ => Vec::new(),
        }
    }

    /// The user variable this effect writes, if any.
    #[must_use]
    pub fn target_variable(&self) -> Option<&str> {
        match self {
            EffectKind::ModifyVariable(p) => p.variable.as_deref(),
            _ => None,
        }
    }
}
