use winnow::ascii::{dec_int, digit1, space0};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::types::{Amount, GameVar};

// -- Lexical ----------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (opt(alt(('-', '+'))), digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .context(StrContext::Expected(StrContextValue::Description("number")))
        .parse_next(input)
}

// -- Amounts ----------------------------------------------------------------

fn game_var(input: &mut &str) -> ModalResult<Amount> {
    "GAMEVAR:".parse_next(input)?;
    let var = cut_err(ident.verify_map(GameVar::from_id))
        .context(StrContext::Expected(StrContextValue::Description(
            "game variable id",
        )))
        .parse_next(input)?;
    let multiplier = opt(preceded('|', cut_err(number)))
        .parse_next(input)?
        .unwrap_or(1.0);
    let offset = opt(preceded('|', cut_err(number)))
        .parse_next(input)?
        .unwrap_or(0.0);
    Ok(Amount::GameVar {
        var,
        multiplier,
        offset,
    })
}

fn range(input: &mut &str) -> ModalResult<Amount> {
    "RANGE:".parse_next(input)?;
    let (a, _, b) = cut_err((dec_int::<_, i64, _>, '|', dec_int::<_, i64, _>))
        .context(StrContext::Expected(StrContextValue::Description(
            "min|max",
        )))
        .parse_next(input)?;
    Ok(Amount::Range {
        min: a.min(b),
        max: a.max(b),
    })
}

/// A full amount in text form, surrounded by optional blanks.
pub(super) fn amount(input: &mut &str) -> ModalResult<Amount> {
    delimited(
        space0,
        alt((
            game_var,
            range,
            number.map(Amount::Literal),
            ident.map(|name: &str| Amount::Variable(name.to_owned())),
        )),
        space0,
    )
    .context(StrContext::Expected(StrContextValue::Description("amount")))
    .parse_next(input)
}

// -- Description placeholders -----------------------------------------------

fn placeholder(input: &mut &str) -> ModalResult<u32> {
    delimited('#', digit1.parse_to::<u32>(), '#').parse_next(input)
}

/// Every `#N#` index in the text, in order of appearance. `#0#` is ignored.
pub(super) fn placeholders(input: &mut &str) -> ModalResult<Vec<u32>> {
    let found: Vec<Option<u32>> =
        repeat(0.., alt((placeholder.map(Some), any.value(None)))).parse_next(input)?;
    Ok(found.into_iter().flatten().filter(|n| *n > 0).collect())
}

#[cfg(test)]
mod tests {
    use crate::parse::{parse_amount, placeholder_count, placeholder_indices};

    use super::*;

    #[test]
    fn parse_literals() {
        assert_eq!(parse_amount("30").unwrap(), Amount::Literal(30.0));
        assert_eq!(parse_amount("-1.5").unwrap(), Amount::Literal(-1.5));
        assert_eq!(parse_amount(" 2 ").unwrap(), Amount::Literal(2.0));
    }

    #[test]
    fn parse_game_var_forms() {
        assert_eq!(
            parse_amount("GAMEVAR:money").unwrap(),
            Amount::game_var(GameVar::Money)
        );
        assert_eq!(
            parse_amount("GAMEVAR:ante|2").unwrap(),
            Amount::GameVar {
                var: GameVar::Ante,
                multiplier: 2.0,
                offset: 0.0
            }
        );
        assert_eq!(
            parse_amount("GAMEVAR:deck_total|0.5|-3").unwrap(),
            Amount::GameVar {
                var: GameVar::DeckTotal,
                multiplier: 0.5,
                offset: -3.0
            }
        );
    }

    #[test]
    fn unknown_game_var_is_an_error() {
        let err = parse_amount("GAMEVAR:moon").unwrap_err();
        assert!(err.to_string().contains("GAMEVAR:moon"), "got {err}");
    }

    #[test]
    fn parse_range_orders_bounds() {
        assert_eq!(
            parse_amount("RANGE:1|5").unwrap(),
            Amount::Range { min: 1, max: 5 }
        );
        assert_eq!(
            parse_amount("RANGE:9|-2").unwrap(),
            Amount::Range { min: -2, max: 9 }
        );
        assert!(parse_amount("RANGE:1").is_err());
    }

    #[test]
    fn parse_variable_reference() {
        assert_eq!(
            parse_amount("counter_2").unwrap(),
            Amount::Variable("counter_2".into())
        );
    }

    #[test]
    fn trailing_garbage_rejected() {
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("1.").is_err());
    }

    #[test]
    fn placeholder_scan() {
        assert_eq!(placeholder_indices("+#1# Mult, #3# Chips"), vec![1, 3]);
        assert_eq!(placeholder_indices("## #x# #0#"), Vec::<u32>::new());
        assert_eq!(placeholder_indices("##2#"), vec![2]);
    }

    #[test]
    fn placeholder_count_over_lines() {
        assert_eq!(placeholder_count(["#2# in #1#", "gain #4#", "#1# again"]), Some(3));
        assert_eq!(placeholder_count(["no vars"]), None);
    }

    #[test]
    fn huge_placeholder_index_counts_once() {
        assert_eq!(placeholder_indices("#3000000#"), vec![3_000_000]);
        assert_eq!(placeholder_count(["#3000000#", "#4000000000#"]), Some(2));
    }
}
