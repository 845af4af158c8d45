use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::value::{Amount, ParamValue};

/// A selectable option stored by id, such as an operator or a suit.
///
/// Unknown ids fall back to [`Default`].
pub trait Choice: Sized + Default {
    fn from_id(id: &str) -> Option<Self>;
}

/// The untyped parameter bag an editor stores for one condition or effect.
///
/// Only used at the construction boundary: every condition and effect kind
/// reads its typed parameters out of a `Params` once.
///
/// A bare name in an amount only refers to a user variable when that
/// variable has been declared with [`Params::with_variables`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
    variables: BTreeSet<String>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Declare the user variables amounts may refer to by name.
    #[must_use]
    pub fn with_variables<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.variables.extend(names.into_iter().map(str::to_owned));
        self
    }

    pub fn insert(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Non-empty, trimmed text stored under `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(ParamValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Text stored under `key`, treating `none`, `any` and `random` as absent.
    #[must_use]
    pub fn key_or_wildcard(&self, key: &str) -> Option<String> {
        self.text(key)
            .filter(|s| !matches!(*s, "none" | "any" | "random"))
            .map(str::to_owned)
    }

    #[must_use]
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            None => default,
            Some(value) => value.as_number().unwrap_or_else(|| {
                debug!(key, ?value, default, "malformed number parameter; using default");
                default
            }),
        }
    }

    #[must_use]
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }

    /// Read an [`Amount`], accepting plain numbers or any of its text forms.
    #[must_use]
    pub fn amount_or(&self, key: &str, default: f64) -> Amount {
        match self.get(key) {
            None => Amount::Literal(default),
            Some(ParamValue::Number(n)) if n.is_finite() => Amount::Literal(*n),
            Some(ParamValue::Text(s)) => match s.parse::<Amount>() {
                Ok(Amount::Variable(name)) if !self.variables.contains(&name) => {
                    debug!(key, variable = %name, default, "undeclared variable in amount; using default");
                    Amount::Literal(default)
                }
                Ok(amount) => amount,
                Err(err) => {
                    debug!(key, text = %s, %err, default, "malformed amount parameter; using default");
                    Amount::Literal(default)
                }
            },
            Some(value) => {
                debug!(key, ?value, default, "non-numeric amount parameter; using default");
                Amount::Literal(default)
            }
        }
    }

    #[must_use]
    pub fn choice<T: Choice>(&self, key: &str) -> T {
        match self.text(key) {
            None => T::default(),
            Some(id) => T::from_id(id).unwrap_or_else(|| {
                debug!(key, id, "unknown option; using default");
                T::default()
            }),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            variables: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::GameVar;

    #[derive(Debug, Default, PartialEq)]
    enum Size {
        #[default]
        Small,
        Large,
    }

    impl Choice for Size {
        fn from_id(id: &str) -> Option<Self> {
            match id {
                "small" => Some(Size::Small),
                "large" => Some(Size::Large),
                _ => None,
            }
        }
    }

    #[test]
    fn number_defaults_when_missing_or_malformed() {
        let params = Params::new().set("a", "x").set("b", 4_i64);
        assert_eq!(params.number_or("a", 25.0), 25.0);
        assert_eq!(params.number_or("b", 25.0), 4.0);
        assert_eq!(params.number_or("c", 52.0), 52.0);
    }

    #[test]
    fn amount_accepts_numbers_and_text_forms() {
        let params = Params::new()
            .set("n", 30_i64)
            .set("t", "12")
            .set("g", "GAMEVAR:money")
            .set("bad", "GAMEVAR:nothing");
        assert_eq!(params.amount_or("n", 0.0), Amount::Literal(30.0));
        assert_eq!(params.amount_or("t", 0.0), Amount::Literal(12.0));
        assert_eq!(params.amount_or("g", 0.0), Amount::game_var(GameVar::Money));
        assert_eq!(params.amount_or("bad", 7.0), Amount::Literal(7.0));
        assert_eq!(params.amount_or("missing", 5.0), Amount::Literal(5.0));
    }

    #[test]
    fn bare_names_need_a_declared_variable() {
        let params = Params::new().set("value", "lots");
        assert_eq!(params.amount_or("value", 8.0), Amount::Literal(8.0));

        let declared = params.with_variables(["lots"]);
        assert_eq!(
            declared.amount_or("value", 8.0),
            Amount::Variable("lots".into())
        );
    }

    #[test]
    fn choice_falls_back_to_default() {
        let params = Params::new().set("s", "large").set("u", "huge");
        assert_eq!(params.choice::<Size>("s"), Size::Large);
        assert_eq!(params.choice::<Size>("u"), Size::Small);
        assert_eq!(params.choice::<Size>("missing"), Size::Small);
    }

    #[test]
    fn wildcards_read_as_absent() {
        let params = Params::new()
            .set("a", "any")
            .set("b", "m_gold")
            .set("c", "  ");
        assert_eq!(params.key_or_wildcard("a"), None);
        assert_eq!(params.key_or_wildcard("b"), Some("m_gold".to_owned()));
        assert_eq!(params.key_or_wildcard("c"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let params: Params = [("value", 3_i64)].into_iter().collect();
        assert_eq!(params.number_or("value", 0.0), 3.0);
    }
}
