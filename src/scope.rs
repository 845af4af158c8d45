use crate::types::{TriggerId, UnitKind};

/// Where a rule is being compiled: the owning unit's kind and runtime key,
/// and the rule's trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    kind: UnitKind,
    trigger: TriggerId,
    object_key: String,
}

impl Scope {
    #[must_use]
    pub fn new(kind: UnitKind, trigger: impl Into<TriggerId>, object_key: impl Into<String>) -> Self {
        Self {
            kind,
            trigger: trigger.into(),
            object_key: object_key.into(),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &TriggerId {
        &self.trigger
    }

    /// The key the runtime registered the unit under, e.g. `m_mod_glassy`.
    #[must_use]
    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Lua path of the unit's `extra` table.
    #[must_use]
    pub fn ability(&self) -> &'static str {
        self.kind.ability_path()
    }
}
