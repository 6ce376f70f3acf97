// Numeric helpers shared by the evaluators: the 00/100 alias, decades, terminals

use crate::types::Amount;
use once_cell::sync::Lazy;
use regex::Regex;

/// Literal value "00" stands for on input
pub const HUNDRED: u32 = 100;

/// The ten numbers whose digits are identical
pub const DOUBLES: [u8; 10] = [0, 11, 22, 33, 44, 55, 66, 77, 88, 99];

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());

/// Parse an endpoint token, reading "00" as 100
pub fn parse_endpoint(token: &str) -> Option<u32> {
    if token == "00" {
        return Some(HUNDRED);
    }
    token.parse::<u32>().ok()
}

/// Parse a stake amount
pub fn parse_amount(token: &str) -> Option<Amount> {
    token.parse::<Amount>().ok()
}

/// Map a number onto its 0-99 slot; 100 folds onto 0
pub fn to_slot(n: u32) -> Option<u8> {
    match n {
        HUNDRED => Some(0),
        0..=99 => Some(n as u8),
        _ => None,
    }
}

/// Base of the decade `n` belongs to (27 -> 20)
pub fn decade_of(n: u8) -> u8 {
    (n / 10) * 10
}

/// Last digit of `n`
pub fn terminal_of(n: u8) -> u8 {
    n % 10
}

/// Zero-pad to two digits
pub fn pad2(n: u8) -> String {
    format!("{:02}", n)
}

/// All standalone digit runs in a line, in order
pub fn number_tokens(line: &str) -> Vec<&str> {
    NUMBER_REGEX.find_iter(line).map(|m| m.as_str()).collect()
}

/// Split a line into its head numbers and the trailing amount.
///
/// The last number on the line is always the amount. Heads are read as plain
/// integers ("00" is 0 here); callers that care about the alias fold through
/// [`to_slot`]. Returns `None` if there is no number at all or a token does
/// not fit.
pub fn heads_and_amount(line: &str) -> Option<(Vec<u32>, Amount)> {
    let tokens = number_tokens(line);
    let (last, heads) = tokens.split_last()?;
    let amount = parse_amount(last)?;
    let heads = heads
        .iter()
        .map(|t| t.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some((heads, amount))
}

/// Parse a winning number as typed by the operator.
///
/// Accepts "0"-"99", and both "00" and "100" as aliases of 0.
pub fn parse_winning(s: &str) -> Result<u8, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("winning number must be 00-99, got '{}'", s));
    }
    parse_endpoint(trimmed)
        .and_then(to_slot)
        .ok_or_else(|| format!("winning number must be 00-99, got '{}'", s))
}
