//! Sell-amount sanitizing and parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use swapdesk_common::constants::{AMOUNT_DECIMALS, AMOUNT_INTEGER_DIGITS};

/// Turn a raw edit of the sell field into the value to store.
///
/// Characters other than ASCII digits and `.` are stripped. The edit is
/// rejected, and `previous` returned unchanged, when the result has more than
/// one decimal point, more than six fractional digits, more integer digits
/// than a decimal can hold, or reads as negative. Whatever is stored either
/// parses with [`parse_amount`] or is a partial entry (`""`, `"."`).
pub fn sanitize(raw: &str, previous: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.matches('.').count() > 1 {
        return previous.to_string();
    }

    let (whole, fraction) = cleaned
        .split_once('.')
        .unwrap_or((cleaned.as_str(), ""));
    if fraction.len() > AMOUNT_DECIMALS as usize {
        return previous.to_string();
    }
    if whole.len() > AMOUNT_INTEGER_DIGITS as usize {
        return previous.to_string();
    }

    if parse_amount(&cleaned).is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
        return previous.to_string();
    }

    cleaned
}

/// Read an amount string as a decimal.
///
/// Accepts a bare trailing or leading point (`"1."`, `".5"`). Returns `None`
/// for an empty string, a lone `"."`, or anything non-numeric.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };

    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, fraction)
    };

    Decimal::from_str(&normalized).ok()
}

/// Check if an amount string reads as a number.
pub fn is_numeric(s: &str) -> bool {
    parse_amount(s).is_some()
}
