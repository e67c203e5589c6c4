//! Currency helpers for Brazilian real amounts.
//!
//! Amounts are kept as exact [`Decimal`] values everywhere; rounding to cents
//! only happens when a value is formatted for display.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MoneyError {
    #[error("invalid currency value '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// A computed amount that does not fit in a [`Decimal`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} is out of the representable range")]
pub struct AmountOverflow(pub &'static str);

/// Turns the result of a `checked_*` operation into a named overflow error.
pub fn checked(what: &'static str, value: Option<Decimal>) -> Result<Decimal, AmountOverflow> {
    value.ok_or(AmountOverflow(what))
}

pub fn checked_sum(what: &'static str, values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, AmountOverflow> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| checked(what, total.checked_add(value)))
}

/// Fails with `err(field)` when `value` is below zero.
pub(crate) fn require_non_negative<E>(
    field: &'static str,
    value: Decimal,
    err: impl FnOnce(&'static str) -> E,
) -> Result<(), E> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(err(field));
    }
    Ok(())
}

peg::parser! {
    grammar brl() for str {
        rule space() = [' ' | '\u{a0}' | '\t']

        rule digit() = ['0'..='9']

        rule symbol() = "R$" space()*

        rule sign() -> bool
            = s:"-"? space()* { s.is_some() }

        // e.g. '1.234.567'
        rule grouped() -> String
            = head:$(digit()*<1,3>) tail:("." group:$(digit()*<3,3>) { group })+ {
                let mut digits = head.to_string();
                for group in tail {
                    digits.push_str(group);
                }
                digits
            }

        // e.g. '1234567'
        rule plain() -> String
            = digits:$(digit()+) { digits.to_string() }

        rule fraction() -> &'input str
            = "," digits:$(digit()+) { digits }

        pub rule amount() -> rust_decimal::Decimal
            = space()* leading:sign() symbol()? trailing:sign() int:(grouped() / plain()) frac:fraction()? space()* {?
                let text = match frac {
                    Some(frac) => format!("{}.{}", int, frac),
                    None => int,
                };
                match (leading && trailing, <rust_decimal::Decimal as std::str::FromStr>::from_str(&text)) {
                    (true, _) => Err("duplicated sign"),
                    (false, Ok(value)) if leading || trailing => Ok(-value),
                    (false, Ok(value)) => Ok(value),
                    (false, Err(_)) => Err("amount out of range"),
                }
            }
    }
}

/// Rounds half away from zero to two decimal places.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a value the way pt-BR locales display currency: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_cents(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let (int_part, frac_part) = split_digits(rounded.abs());

    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.push_str("R$ ");
    result.push_str(&group_thousands(&int_part));
    result.push(',');
    result.push_str(&frac_part);
    result
}

/// Formats a percentage with a decimal comma: `43,50%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = round_cents(value);
    let (int_part, frac_part) = split_digits(rounded.abs());
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{},{}%", sign, int_part, frac_part)
}

/// Parses a pt-BR currency string such as `R$ 1.234,56`, `-R$ 10,00` or `1234,5`.
pub fn parse_brl(input: &str) -> Result<Decimal, MoneyError> {
    brl::amount(input).map_err(|e| MoneyError::Invalid {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a form field that may hold either a pt-BR amount or a plain
/// dot-decimal number (`1234.56`).
pub fn parse_input(input: &str) -> Result<Decimal, MoneyError> {
    let trimmed = input.trim();
    if !trimmed.contains(',') && trimmed.matches('.').count() == 1 {
        if let Ok(value) = Decimal::from_str(trimmed) {
            if trimmed.split('.').nth(1).map_or(false, |frac| frac.len() != 3) {
                return Ok(value);
            }
        }
    }
    parse_brl(trimmed)
}

fn split_digits(value: Decimal) -> (String, String) {
    let text = format!("{:.2}", value);
    match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (text, "00".to_string()),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(999)), "R$ 999,00");
        assert_eq!(format_brl(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_brl(dec!(-10.5)), "-R$ 10,50");
        assert_eq!(format_brl(dec!(31325.301204)), "R$ 31.325,30");
    }

    #[test]
    fn test_format_rounds_half_up() {
        assert_eq!(format_brl(dec!(0.005)), "R$ 0,01");
        assert_eq!(format_brl(dec!(2.675)), "R$ 2,68");
        assert_eq!(format_brl(dec!(-0.004)), "R$ 0,00");
    }

    #[test]
    fn test_parse_brl() {
        assert_eq!(parse_brl("R$ 1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_brl("R$\u{a0}1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_brl("-R$ 10,50").unwrap(), dec!(-10.50));
        assert_eq!(parse_brl("R$ -10,50").unwrap(), dec!(-10.50));
        assert_eq!(parse_brl("1234,5").unwrap(), dec!(1234.5));
        assert_eq!(parse_brl("  42 ").unwrap(), dec!(42));
        assert_eq!(parse_brl("1.000.000").unwrap(), dec!(1000000));
    }

    #[test]
    fn test_parse_brl_rejects_garbage() {
        assert!(parse_brl("abc").is_err());
        assert!(parse_brl("").is_err());
        assert!(parse_brl("1.23,00").is_err());
        assert!(parse_brl("-R$ -1,00").is_err());
        assert!(parse_brl("12,34,56").is_err());
    }

    #[test]
    fn test_parse_input_accepts_dot_decimal() {
        assert_eq!(parse_input("1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_input("1.234").unwrap(), dec!(1234));
        assert_eq!(parse_input("R$ 8.000,00").unwrap(), dec!(8000));
        assert!(parse_input("dez reais").is_err());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(43.5)), "43,50%");
        assert_eq!(format_percent(dec!(-1.234)), "-1,23%");
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        assert_eq!(checked_sum("total", [dec!(1.5), dec!(2.5)]), Ok(dec!(4)));
        assert_eq!(checked_sum("total", [Decimal::MAX, Decimal::ONE]), Err(AmountOverflow("total")));
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(require_non_negative("qty", Decimal::ZERO, |f| f), Ok(()));
        assert_eq!(require_non_negative("qty", dec!(-0.01), |f| f), Err("qty"));
    }

    #[quickcheck]
    fn format_then_parse_keeps_cents(cents: i64) -> bool {
        let value = Decimal::new(cents, 2);
        parse_brl(&format_brl(value)).unwrap() == value
    }

    #[quickcheck]
    fn format_then_parse_matches_rounded(mills: i32) -> bool {
        let value = Decimal::new(mills as i64, 3);
        parse_brl(&format_brl(value)).unwrap() == round_cents(value)
    }
}
