use crate::lua::lua_number;
use crate::types::UserVariable;

/// What introduced a config variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Declared by the user on the unit.
    User,
    /// A literal effect amount.
    Effect,
    /// A probability denominator shared by random groups.
    Odds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigVar {
    pub name: String,
    pub value: f64,
    pub kind: VarKind,
}

impl ConfigVar {
    /// The `name = value` text placed in the unit's `extra` table.
    #[must_use]
    pub fn entry(&self) -> String {
        format!("{} = {}", self.name, lua_number(self.value))
    }
}

/// Allocator for the variables of one unit's `extra` table.
///
/// A claim reuses an existing variable when the name and value match, and
/// otherwise takes the next free numbered name: `mult`, `mult2`, `mult3`.
#[derive(Debug, Clone, Default)]
pub struct ConfigVars {
    entries: Vec<ConfigVar>,
}

impl ConfigVars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with the unit's declared variables.
    #[must_use]
    pub fn with_user(variables: &[UserVariable]) -> Self {
        Self {
            entries: variables
                .iter()
                .map(|v| ConfigVar {
                    name: v.name.clone(),
                    value: v.initial,
                    kind: VarKind::User,
                })
                .collect(),
        }
    }

    /// Bind a literal effect amount, returning the variable name.
    pub fn claim(&mut self, base: &str, value: f64) -> &ConfigVar {
        self.claim_kind(base, value, VarKind::Effect)
    }

    /// Bind a probability denominator; equal denominators share a variable.
    pub fn claim_odds(&mut self, denominator: u32) -> &ConfigVar {
        self.claim_kind("odds", f64::from(denominator), VarKind::Odds)
    }

    fn claim_kind(&mut self, base: &str, value: f64, kind: VarKind) -> &ConfigVar {
        let mut suffix = 1_usize;
        loop {
            let name = if suffix == 1 {
                base.to_owned()
            } else {
                format!("{base}{suffix}")
            };
            match self.entries.iter().position(|e| e.name == name) {
                Some(i) if self.entries[i].kind == kind && self.entries[i].value == value => {
                    return &self.entries[i];
                }
                Some(_) => suffix += 1,
                None => {
                    self.entries.push(ConfigVar { name, value, kind });
                    let last = self.entries.len() - 1;
                    return &self.entries[last];
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigVar> {
        self.entries.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_reuses_name() {
        let mut vars = ConfigVars::new();
        assert_eq!(vars.claim("mult", 5.0).name, "mult");
        assert_eq!(vars.claim("mult", 5.0).name, "mult");
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn different_value_gets_numbered_name() {
        let mut vars = ConfigVars::new();
        vars.claim("chips", 10.0);
        assert_eq!(vars.claim("chips", 20.0).name, "chips2");
        assert_eq!(vars.claim("chips", 30.0).name, "chips3");
        assert_eq!(vars.claim("chips", 20.0).name, "chips2");
        let entries: Vec<String> = vars.iter().map(ConfigVar::entry).collect();
        assert_eq!(entries, vec!["chips = 10", "chips2 = 20", "chips3 = 30"]);
    }

    #[test]
    fn user_variables_are_never_reused_by_effects() {
        let mut vars = ConfigVars::with_user(&[UserVariable {
            name: "mult".into(),
            initial: 5.0,
        }]);
        let claimed = vars.claim("mult", 5.0);
        assert_eq!(claimed.name, "mult2");
        assert_eq!(claimed.kind, VarKind::Effect);
    }

    #[test]
    fn odds_share_by_denominator() {
        let mut vars = ConfigVars::new();
        assert_eq!(vars.claim_odds(4).name, "odds");
        assert_eq!(vars.claim_odds(6).name, "odds2");
        assert_eq!(vars.claim_odds(4).name, "odds");
        assert_eq!(vars.iter().filter(|v| v.kind == VarKind::Odds).count(), 2);
    }

    #[test]
    fn entry_renders_lua_number() {
        let mut vars = ConfigVars::new();
        assert_eq!(vars.claim("x_mult", 1.5).entry(), "x_mult = 1.5");
    }
}
