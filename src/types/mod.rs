mod artifact;
mod card;
mod condition;
mod effect;
mod error;
mod expr;
mod params;
mod rule;
mod trigger;
mod unit;
mod value;

pub use artifact::{Artifact, ArtifactSet, Position};
pub use card::{Rank, Suit};
pub use condition::{
    BlindKind, CardSlot, CompareParams, ConditionKind, DeckSource, EnhancementCountParams,
    GenericCompareParams, HandMatch, HandScope, HandTypeParams, RankGroup, RankTest, SuitGroup,
    SuitTest, VariableCompareParams,
};
pub use effect::{
    Colour, ConsumableParams, ConsumableSet, CopyTarget, EditCardParams, EditOp, EditParams,
    EffectKind, JokerSpawnParams, LevelUpParams, MessageParams, ModifyVariableParams, Rarity,
    VarOp,
};
pub use error::ModelError;
pub use expr::{CompareOp, Expr, LogicOp};
pub use params::{Choice, Params};
pub use rule::{Condition, ConditionGroup, Effect, RandomGroup, Rule};
pub use trigger::TriggerId;
pub use unit::{GroupBuilder, RuleBuilder, Unit, UnitBuilder, UnitFlags, UnitKind, UserVariable};
pub(crate) use unit::is_identifier;
pub use value::{Amount, GameVar, ParamValue};
