use thiserror::Error;

/// Structural problems caught while constructing units.
///
/// Unknown ids and malformed parameter values are not errors; they degrade
/// to "no constraint", "no fragment" or a default.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid unit key '{key}'; expected lowercase letters, digits and '_'")]
    InvalidKey { key: String },

    #[error("duplicate unit key '{key}'")]
    DuplicateUnitKey { key: String },

    #[error("duplicate rule id '{rule}' in unit '{unit}'")]
    DuplicateRule { unit: String, rule: String },

    #[error("random group '{group}' in rule '{rule}' has a zero chance denominator")]
    ZeroDenominator { rule: String, group: String },

    #[error("invalid variable name '{name}'")]
    InvalidVariable { name: String },

    #[error("duplicate variable '{name}'")]
    DuplicateVariable { name: String },

    #[error("rule '{rule}' refers to undeclared variable '{name}'")]
    UndeclaredVariable { rule: String, name: String },

    #[error("unknown unit kind '{kind}'; expected 'enhancement' or 'seal'")]
    UnknownUnitKind { kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_message() {
        let err = ModelError::InvalidKey {
            key: "Bad Key".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid unit key 'Bad Key'; expected lowercase letters, digits and '_'"
        );
    }

    #[test]
    fn duplicate_rule_message() {
        let err = ModelError::DuplicateRule {
            unit: "glassy".into(),
            rule: "r1".into(),
        };
        assert_eq!(err.to_string(), "duplicate rule id 'r1' in unit 'glassy'");
    }

    #[test]
    fn zero_denominator_message() {
        let err = ModelError::ZeroDenominator {
            rule: "r1".into(),
            group: "g1".into(),
        };
        assert_eq!(
            err.to_string(),
            "random group 'g1' in rule 'r1' has a zero chance denominator"
        );
    }

    #[test]
    fn variable_messages() {
        assert_eq!(
            ModelError::InvalidVariable { name: "1x".into() }.to_string(),
            "invalid variable name '1x'"
        );
        assert_eq!(
            ModelError::DuplicateVariable {
                name: "count".into()
            }
            .to_string(),
            "duplicate variable 'count'"
        );
    }

    #[test]
    fn duplicate_unit_key_message() {
        let err = ModelError::DuplicateUnitKey {
            key: "glassy".into(),
        };
        assert_eq!(err.to_string(), "duplicate unit key 'glassy'");
    }
}
