use std::fmt;
use std::ops::Not;

use super::params::Choice;

/// Comparison operators supported by numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    #[default]
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Choice for CompareOp {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "equals" => Some(CompareOp::Eq),
            "not_equals" => Some(CompareOp::Neq),
            "greater_than" => Some(CompareOp::Gt),
            "greater_equals" => Some(CompareOp::Gte),
            "less_than" => Some(CompareOp::Lt),
            "less_equals" => Some(CompareOp::Lte),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "~="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// Boolean connective between two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicOp {
    #[default]
    And,
    Or,
}

impl Choice for LogicOp {
    fn from_id(id: &str) -> Option<Self> {
        if id.eq_ignore_ascii_case("and") {
            Some(LogicOp::And)
        } else if id.eq_ignore_ascii_case("or") {
            Some(LogicOp::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => write!(f, "and"),
            LogicOp::Or => write!(f, "or"),
        }
    }
}

/// Lua boolean expression assembled from lowered conditions.
///
/// Rendering makes precedence explicit: an `and` operand that is an `or`
/// (or the reverse) is parenthesized, so a left fold renders as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Lowered condition text; atoms are already self-contained.
    Atom(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Paren(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn atom(text: impl Into<String>) -> Expr {
        Expr::Atom(text.into())
    }

    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn join(self, op: LogicOp, other: Expr) -> Expr {
        match op {
            LogicOp::And => self.and(other),
            LogicOp::Or => self.or(other),
        }
    }

    /// Wrap in parentheses unless already wrapped.
    #[must_use]
    pub fn paren(self) -> Expr {
        match self {
            Expr::Paren(_) => self,
            other => Expr::Paren(Box::new(other)),
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, parent_is_and: bool) -> fmt::Result {
        match (self, parent_is_and) {
            (Expr::Or(..), true) | (Expr::And(..), false) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(text) => write!(f, "{text}"),
            Expr::And(a, b) => {
                a.write_operand(f, true)?;
                write!(f, " and ")?;
                b.write_operand(f, true)
            }
            Expr::Or(a, b) => {
                a.write_operand(f, false)?;
                write!(f, " or ")?;
                b.write_operand(f, false)
            }
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Paren(_) => write!(f, "not {inner}"),
                _ => write!(f, "not ({inner})"),
            },
            Expr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(s: &str) -> Expr {
        Expr::atom(s)
    }

    #[test]
    fn compare_op_ids_and_symbols() {
        let cases = [
            ("equals", "=="),
            ("not_equals", "~="),
            ("greater_than", ">"),
            ("greater_equals", ">="),
            ("less_than", "<"),
            ("less_equals", "<="),
        ];
        for (id, symbol) in cases {
            let op = CompareOp::from_id(id).unwrap();
            assert_eq!(op.to_string(), symbol, "failed for {id}");
        }
        assert_eq!(CompareOp::from_id("between"), None);
        assert_eq!(CompareOp::default().to_string(), "==");
    }

    #[test]
    fn logic_op_is_case_insensitive() {
        assert_eq!(LogicOp::from_id("OR"), Some(LogicOp::Or));
        assert_eq!(LogicOp::from_id("and"), Some(LogicOp::And));
        assert_eq!(LogicOp::from_id("xor"), None);
    }

    #[test]
    fn left_fold_keeps_written_grouping() {
        let expr = a("c1").or(a("c2")).and(a("c3"));
        assert_eq!(expr.to_string(), "(c1 or c2) and c3");

        let expr = a("c1").and(a("c2")).or(a("c3"));
        assert_eq!(expr.to_string(), "(c1 and c2) or c3");
    }

    #[test]
    fn same_operator_chains_flat() {
        let expr = a("x").and(a("y")).and(a("z"));
        assert_eq!(expr.to_string(), "x and y and z");
    }

    #[test]
    fn not_wraps_only_its_operand() {
        let expr = (!a("x")).and(a("y"));
        assert_eq!(expr.to_string(), "not (x) and y");
    }

    #[test]
    fn paren_is_idempotent() {
        let expr = a("x").or(a("y")).paren().paren();
        assert_eq!(expr.to_string(), "(x or y)");
        assert_eq!((!expr).to_string(), "not (x or y)");
    }
}
