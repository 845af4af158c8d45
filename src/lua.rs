//! Lua text helpers shared by the compiler stages.

use std::fmt::Write as _;

use crate::scope::Scope;
use crate::types::Amount;

const INDENT: &str = "    ";

/// Render a number the way Lua source spells it: integers without a
/// fractional part, `-0` as `0`.
pub(crate) fn lua_number(v: f64) -> String {
    if !v.is_finite() || v == 0.0 {
        return "0".to_owned();
    }
    format!("{v}")
}

/// A double-quoted Lua string literal.
pub(crate) fn lua_string(s: &str) -> String {
    quoted(s, '"')
}

/// A single-quoted Lua string literal, used for seeds and object keys.
pub(crate) fn lua_key(s: &str) -> String {
    quoted(s, '\'')
}

fn quoted(s: &str, delim: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// The Lua expression for an amount read at runtime, without binding
/// literals to config variables.
///
/// `seed` names the pseudorandom stream used by ranges.
pub(crate) fn inline_amount(amount: &Amount, scope: &Scope, seed: &str) -> String {
    match amount {
        Amount::Literal(v) => lua_number(*v),
        Amount::GameVar {
            var,
            multiplier,
            offset,
        } => {
            let mut expr = var.lua().to_owned();
            let composite = *multiplier != 1.0 || *offset != 0.0;
            if *multiplier != 1.0 {
                let _ = write!(expr, " * {}", lua_number(*multiplier));
            }
            if *offset > 0.0 {
                let _ = write!(expr, " + {}", lua_number(*offset));
            } else if *offset < 0.0 {
                let _ = write!(expr, " - {}", lua_number(-offset));
            }
            if composite {
                format!("({expr})")
            } else {
                expr
            }
        }
        Amount::Variable(name) => format!("{}.{name}", scope.ability()),
        Amount::Range { min, max } => format!(
            "pseudorandom({}, {min}, {max})",
            lua_key(&format!("{seed}_{}", scope.object_key()))
        ),
    }
}

/// Indentation-aware line buffer.
///
/// Multi-line text passed to [`LuaWriter::line`] is indented line by line,
/// so statements can carry their own nested structure.
#[derive(Debug, Default)]
pub(crate) struct LuaWriter {
    out: String,
    depth: usize,
}

impl LuaWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.out.push('\n');
                continue;
            }
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text` and indent what follows.
    pub(crate) fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent and write `text`.
    pub(crate) fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
