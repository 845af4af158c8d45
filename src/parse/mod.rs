use std::collections::BTreeSet;

mod error;
mod grammar;

pub use error::ParseError;

use crate::types::Amount;

/// Parse the text form of an [`Amount`].
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a number, a `GAMEVAR:` or
/// `RANGE:` reference, or an identifier.
pub fn parse_amount(input: &str) -> Result<Amount, ParseError> {
    use winnow::Parser;
    grammar::amount
        .parse(input)
        .map_err(|e| ParseError::new(input, e.to_string()))
}

/// Every `#N#` description placeholder in `text`, in order.
#[must_use]
pub fn placeholder_indices(text: &str) -> Vec<u32> {
    use winnow::Parser;
    grammar::placeholders.parse(text).unwrap_or_default()
}

/// How many distinct `#N#` placeholders the description lines use, or
/// `None` when there are none.
pub fn placeholder_count<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<usize> {
    let distinct: BTreeSet<u32> = lines.into_iter().flat_map(placeholder_indices).collect();
    (!distinct.is_empty()).then_some(distinct.len())
}
