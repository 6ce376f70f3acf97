// Shape grammars: which kind of bet a single normalized line is

use crate::rules::{apply_rules, RewriteRule};
use crate::types::{BetLine, ShapeTag};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_CLEANUP: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::replace("collapse-whitespace", r"\s+", " "),
        RewriteRule::replace("tight-commas", r"\s*,\s*", ","),
        RewriteRule::replace("tight-dashes", r"\s+-\s+", "-"),
        RewriteRule::replace("spaced-con", r"(?i)\s+con\s+", "-con-"),
    ]
});

static SMS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^sms(?:\s*:?\s*|-.*)$").unwrap());

static SOLITARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").unwrap());

/// Grammars in dispatch priority order. The first match wins and the line
/// never falls through to a later grammar, even if its evaluator rejects it.
static GRAMMARS: Lazy<Vec<(ShapeTag, Regex)>> = Lazy::new(|| {
    [
        (
            ShapeTag::Line,
            r"(?i)^l(?:inea)?(?:[-., /]+\d{1,2}){1,2}[-.+=, /]+(?:con[-.,]*)*\d+$",
        ),
        (
            ShapeTag::LineWithAnd,
            r"(?i)^l(?:inea)?-\d{1,2}(?:-y-\d{1,2})+[-.+=, /]+(?:con[-.,]*)*\d+$",
        ),
        (
            ShapeTag::Decade,
            r"(?i)^(?:decena|dece|dec|d)[-., ]*(\d{1,2})[-., ]*(?:con[-.,]*)*(\d+)$",
        ),
        (
            ShapeTag::DecadeWithAnd,
            r"(?i)^(?:decena|dece|dec|d)[-., /]+(?:\d{1,2}[-., /]+)+\d{1,2}[-., /]+(?:con[-.,]*)*\d+$",
        ),
        (
            ShapeTag::Terminal,
            r"(?i)^t(?:erminal)?[-.+=, /]+\d{1,2}[-.+=, /]+(?:con[-.,/]*)*\d+$",
        ),
        (
            ShapeTag::TerminalMulti,
            r"(?i)^t(?:erminal)?[-.+=, /]+\d{1,2}(?:[-.+=, /]+\d{1,2})+[-.+=, /]+(?:con[-.,/]*)*\d+$",
        ),
        (
            ShapeTag::Pair,
            r"(?i)^p(?:areja)?[-.+=, /]+(?:con[-.,]*)*\d+$",
        ),
        (
            ShapeTag::TerminalRange,
            r"(?i)^(?:0?[1-9]|10)[-_\s]*al[-_\s]*(?:9[1-9]|100|00)[-.+=, /]+(?:con[-.,]*)*\d+$",
        ),
        (
            ShapeTag::PairRange,
            r"(?i)^(?:11|00|100)[-_\s]*al[-_\s]*(?:00|99|100|109)[-_\s]*con[-_\s]*\d+$",
        ),
        (
            ShapeTag::NumberToNumber,
            r"(?i)^(?:del[-\s]*)?(\d+)\W+al\W+(\d+)\W*(?:con|c)?\W*(\d+)$",
        ),
        (
            ShapeTag::NumberRange,
            r"(?i)^\d{1,2}(?:-\d{1,2})?-(?:con-)?\d+$",
        ),
        (
            ShapeTag::GenericList,
            r"(?i)^\d{1,3}(?:[-.+=, /]+\d{1,3})*[-.+=, /]+(?:con[-.+=, /]*)?\d+$",
        ),
    ]
    .into_iter()
    .map(|(tag, pattern)| (tag, Regex::new(pattern).unwrap()))
    .collect()
});

/// Tighten whitespace around separators so the grammars see one spelling
pub fn clean_line(line: &str) -> String {
    apply_rules(line, &LINE_CLEANUP).trim().to_string()
}

pub fn is_sms_marker(line: &str) -> bool {
    SMS_REGEX.is_match(line)
}

/// A bare number of three or more digits with no amount
pub fn is_solitary(line: &str) -> bool {
    SOLITARY_REGEX.is_match(line)
}

/// The grammar registered for a tag, if it has one
pub fn pattern(tag: ShapeTag) -> Option<&'static Regex> {
    GRAMMARS.iter().find(|(t, _)| *t == tag).map(|(_, re)| re)
}

/// Match a cleaned line against the grammars in priority order.
///
/// SMS markers are checked first, then solitary numbers (always
/// [`ShapeTag::Invalid`]), then the bet grammars.
pub fn match_shape(line: &str) -> ShapeTag {
    if is_sms_marker(line) {
        return ShapeTag::SmsMarker;
    }
    if is_solitary(line) {
        return ShapeTag::Invalid;
    }
    GRAMMARS
        .iter()
        .find(|(_, re)| re.is_match(line))
        .map(|(tag, _)| *tag)
        .unwrap_or(ShapeTag::Invalid)
}

/// Clean a raw line and attach the shape it matches
pub fn recognize(raw: &str) -> BetLine {
    let cleaned = clean_line(raw);
    let shape = match_shape(&cleaned);
    BetLine {
        raw: raw.to_string(),
        cleaned,
        shape,
    }
}
