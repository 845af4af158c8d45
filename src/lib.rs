//! Compiles structured When/If/Then card rules into Steamodded Lua.
//!
//! A [`Unit`] is one enhancement or seal. Each of its rules names a trigger,
//! an optional boolean composition of conditions, and effects, some of them
//! behind a random chance. The [`Compiler`] turns units into self-contained
//! `SMODS.Enhancement` / `SMODS.Seal` files.

mod assemble;
mod compiler;
mod condition;
mod effect;
mod error;
mod load;
mod loader;
mod lua;
mod parse;
mod scope;
#[cfg(feature = "binary-cache")]
mod serial;
mod trigger;
mod types;
mod vars;

pub use compiler::{compile_unit, CompileOptions, Compiler};
pub use condition::{compile_condition_chain, condition_expr};
pub use effect::{compile_effects, EffectOutput, Field, ProbabilityVar, ResultTable};
pub use error::ForgeError;
pub use load::load_units;
pub use parse::{parse_amount, placeholder_count, placeholder_indices, ParseError};
pub use scope::Scope;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use trigger::{resolve_trigger, static_field, FoldKind, StaticField, TriggerInfo};
pub use types::{
    Amount, Artifact, ArtifactSet, BlindKind, CardSlot, Choice, Colour, CompareOp,
    CompareParams, Condition, ConditionGroup, ConditionKind, ConsumableParams, ConsumableSet,
    CopyTarget, DeckSource, EditCardParams, EditOp, EditParams, Effect, EffectKind,
    EnhancementCountParams, Expr, GameVar, GenericCompareParams, GroupBuilder, HandMatch,
    HandScope, HandTypeParams, JokerSpawnParams, LevelUpParams, LogicOp, MessageParams,
    ModelError, ModifyVariableParams, ParamValue, Params, Position, RandomGroup, Rank,
    RankGroup, RankTest, Rarity, Rule, RuleBuilder, Suit, SuitGroup, SuitTest, TriggerId, Unit,
    UnitBuilder, UnitFlags, UnitKind, UserVariable, VarOp, VariableCompareParams,
};
pub use vars::{ConfigVar, ConfigVars, VarKind};
