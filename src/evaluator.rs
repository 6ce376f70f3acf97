//! Per-shape evaluators.
//!
//! Each evaluator takes a cleaned line that already matched its grammar and
//! the winning number (already folded onto 0-99) and expands the bet into
//! its coverage, total wagered and prize. `None` means the line matched the
//! grammar but failed a numeric check, e.g. a terminal head above 9.

use crate::grammar;
use crate::numbers::{
    decade_of, heads_and_amount, parse_amount, parse_endpoint, terminal_of, to_slot, DOUBLES, HUNDRED,
};
use crate::types::{Amount, BetEvaluation, ShapeTag};
use std::collections::BTreeSet;

pub type Evaluator = fn(&str, Option<u8>) -> Option<BetEvaluation>;

/// Heads a Linea bet may start from; 1 is the "01" spelling of the first decade
const LINE_HEADS: [u32; 11] = [0, 1, 10, 20, 30, 40, 50, 60, 70, 80, 90];

/// Evaluator registered for a shape, `None` for shapes that carry no wager
pub fn evaluator_for(tag: ShapeTag) -> Option<Evaluator> {
    let evaluator: Evaluator = match tag {
        ShapeTag::Line => evaluate_line,
        ShapeTag::LineWithAnd => evaluate_line_with_and,
        ShapeTag::Decade => evaluate_decade,
        ShapeTag::DecadeWithAnd => evaluate_decade_with_and,
        ShapeTag::Terminal | ShapeTag::TerminalMulti => evaluate_terminal,
        ShapeTag::Pair => evaluate_pair,
        ShapeTag::PairRange => evaluate_pair_range,
        ShapeTag::TerminalRange => evaluate_terminal_range,
        ShapeTag::NumberToNumber => evaluate_number_to_number,
        ShapeTag::NumberRange | ShapeTag::GenericList => evaluate_list,
        ShapeTag::SmsMarker | ShapeTag::Invalid => return None,
    };
    Some(evaluator)
}

/// Run the evaluator registered for `tag`
pub fn evaluate(tag: ShapeTag, line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    evaluator_for(tag).and_then(|evaluator| evaluator(line, winning))
}

/// Same stake on every number of a set
fn flat_stake(numbers: BTreeSet<u8>, amount: Amount, winning: Option<u8>) -> Option<BetEvaluation> {
    let total_wagered = amount.checked_mul(numbers.len() as Amount)?;
    let prize = match winning {
        Some(w) if numbers.contains(&w) => amount,
        _ => 0,
    };
    Some(BetEvaluation {
        coverage: numbers.into_iter().map(|n| (n, amount)).collect(),
        total_wagered,
        prize,
    })
}

/// Fold one part of a multi-head bet into the running result
fn merge(mut acc: BetEvaluation, part: BetEvaluation) -> Option<BetEvaluation> {
    acc.total_wagered = acc.total_wagered.checked_add(part.total_wagered)?;
    acc.prize = acc.prize.checked_add(part.prize)?;
    acc.coverage.extend(part.coverage);
    Some(acc)
}

fn span(from: u8, to: u8) -> BTreeSet<u8> {
    (from..=to).collect()
}

fn line_decade(head: u8) -> BTreeSet<u8> {
    let base = decade_of(head);
    span(base, base + 9)
}

/// Two heads far apart each take their own full decade, except 00/10 and
/// 00/20 which read as one run starting at 0.
fn splits_into_decades(a: u8, b: u8) -> bool {
    a.abs_diff(b) >= 10 && !matches!((a.min(b), a.max(b)), (0, 10) | (0, 20))
}

fn line_numbers(heads: &[u32]) -> Option<BTreeSet<u8>> {
    if heads.iter().any(|h| !LINE_HEADS.contains(h)) {
        return None;
    }
    let heads: Vec<u8> = heads.iter().map(|&h| h as u8).collect();
    match heads.as_slice() {
        [a] => Some(span(*a, *a + 9)),
        [a, b] if splits_into_decades(*a, *b) => {
            let mut numbers = line_decade(*a);
            numbers.extend(line_decade(*b));
            Some(numbers)
        }
        [a, b] => Some(span(*a.min(b), *a.max(b))),
        _ => None,
    }
}

pub fn evaluate_line(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    flat_stake(line_numbers(&heads)?, amount, winning)
}

/// Every head joined by "y" is its own line bet with the shared amount
pub fn evaluate_line_with_and(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    if heads.is_empty() {
        return None;
    }
    heads.iter().try_fold(BetEvaluation::default(), |acc, &head| {
        let part = flat_stake(line_numbers(&[head])?, amount, winning)?;
        merge(acc, part)
    })
}

fn decade_numbers(head: u32) -> Option<BTreeSet<u8>> {
    if head > 90 || head % 10 != 0 {
        return None;
    }
    let head = head as u8;
    Some(span(head, head + 9))
}

/// Head and amount come from the grammar captures, so a glued
/// `Decena-105` reads as head 10 with amount 5.
pub fn evaluate_decade(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let caps = grammar::pattern(ShapeTag::Decade)?.captures(line)?;
    let head = caps[1].parse::<u32>().ok()?;
    let amount = parse_amount(&caps[2])?;
    flat_stake(decade_numbers(head)?, amount, winning)
}

pub fn evaluate_decade_with_and(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    if heads.is_empty() {
        return None;
    }
    heads.iter().try_fold(BetEvaluation::default(), |acc, &head| {
        merge(acc, flat_stake(decade_numbers(head)?, amount, winning)?)
    })
}

/// Each head digit stakes the amount on all ten numbers ending in it.
/// One head outside 0-9 rejects the whole line.
pub fn evaluate_terminal(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    if heads.is_empty() || heads.iter().any(|&h| h > 9) {
        return None;
    }
    heads.iter().try_fold(BetEvaluation::default(), |acc, &head| {
        let digit = head as u8;
        let numbers = (0..10).map(|tens| tens * 10 + digit).collect();
        merge(acc, flat_stake(numbers, amount, winning)?)
    })
}

fn doubles() -> BTreeSet<u8> {
    DOUBLES.iter().copied().collect()
}

pub fn evaluate_pair(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (_, amount) = heads_and_amount(line)?;
    if amount == 0 {
        return None;
    }
    flat_stake(doubles(), amount, winning)
}

/// The range written on the line is ignored; only the trailing amount counts
pub fn evaluate_pair_range(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (_, amount) = heads_and_amount(line)?;
    flat_stake(doubles(), amount, winning)
}

/// Numbers sharing the first head's last digit, from that digit up to 100
pub fn evaluate_terminal_range(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    let head = u8::try_from(*heads.first()?).ok()?;
    let digit = u32::from(terminal_of(head));
    let numbers = (digit..=HUNDRED).step_by(10).filter_map(to_slot).collect();
    flat_stake(numbers, amount, winning)
}

pub fn evaluate_number_to_number(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let caps = grammar::pattern(ShapeTag::NumberToNumber)?.captures(line)?;
    let start = parse_endpoint(&caps[1])?;
    let end = parse_endpoint(&caps[2])?;
    let amount = parse_amount(&caps[3])?;
    if start > HUNDRED || end > HUNDRED {
        return None;
    }

    // "00 al 30" wraps round to 0
    let range = if start == HUNDRED && end < HUNDRED {
        0..=end
    } else {
        start..=end
    };
    let numbers: BTreeSet<u8> = range.filter_map(to_slot).collect();
    if numbers.is_empty() {
        return None;
    }
    flat_stake(numbers, amount, winning)
}

/// Plain list of heads. Wager and prize count every head, duplicates
/// included, while the coverage map keeps one entry per number.
pub fn evaluate_list(line: &str, winning: Option<u8>) -> Option<BetEvaluation> {
    let (heads, amount) = heads_and_amount(line)?;
    if heads.is_empty() {
        return None;
    }
    let slots = heads.iter().map(|&h| to_slot(h)).collect::<Option<Vec<u8>>>()?;

    let total_wagered = amount.checked_mul(slots.len() as Amount)?;
    let hits = winning.map_or(0, |w| slots.iter().filter(|&&s| s == w).count());
    let prize = amount.checked_mul(hits as Amount)?;

    Some(BetEvaluation {
        coverage: slots.into_iter().map(|s| (s, amount)).collect(),
        total_wagered,
        prize,
    })
}
