//! Text normalization for pasted betting slips.
//!
//! A single pass runs seven ordered stages:
//!
//! 1. envelope: chat headers and SMS envelopes become an `sms` marker line
//! 2. folding: whitespace runs, repeated punctuation, diacritics, `o` for `0`
//! 3. keywords: `TerminaL`, `Linea`, `Pareja`, `Decena`, `-con-`, `-aL-`
//! 4. structure: line breaks between bets pasted on one line
//! 5. tidy: spacing around separators, odd symbols to `-`
//! 6. boundaries: zero-padding, then letter/digit splitting
//! 7. cleanup: chatter words, stray separators, blank lines
//!
//! The structural table is swept until stable or until
//! [`Limits::repair_iterations`] sweeps; the whole pass is repeated until the
//! text stops changing or [`Limits::max_passes`] passes have run, so the
//! output of [`normalize`] is a fixed point of the pipeline.

use crate::rules::{apply_rules, fixed_point, RewriteRule};
use crate::types::Limits;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Separators that may surround a connector word
const SEP: &str = r"[-.,;:=+*_^¨'/ ]";

/// Normalize raw pasted text with default limits
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &Limits::default())
}

/// Normalize raw pasted text, iterating whole passes to a fixed point
pub fn normalize_with(raw: &str, limits: &Limits) -> String {
    fixed_point(raw, limits.max_passes, |text| normalize_pass(text, limits))
}

/// One pass of every stage, in order
pub fn normalize_pass(text: &str, limits: &Limits) -> String {
    let text = apply_rules(text, &ENVELOPE_RULES);
    let text = apply_rules(&text, &FOLDING_RULES);
    let text = apply_rules(&text, &KEYWORD_RULES);
    let text = repair_structure(&text, limits.repair_iterations);
    let text = apply_rules(&text, &TIDY_RULES);
    let text = apply_rules(&text, &BOUNDARY_RULES);
    apply_rules(&text, &CLEANUP_RULES)
}

/// Sweep the structural table until nothing splits any more
pub fn repair_structure(text: &str, iterations: usize) -> String {
    fixed_point(text, iterations, |t| apply_rules(t, &STRUCTURAL_RULES))
}

// ---------------------------------------------------------------------------
// Stage 1: envelope

static ENVELOPE_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::replace("line-endings", r"\r\n?", "\n"),
        // [12/03/2024 10:15 AM] Juan 10% Grupo Norte: ...
        RewriteRule::replace(
            "whatsapp-group-header",
            r"(?i)\[\d{1,2}[/-]\d{1,2}[/-]\d{2,4},?[ \t]+\d{1,2}[:|-]\d{2}(?::\d{2})?[ \t]*(?:[ap]\.?[ \t]?m\.?)?\][^\n]*?gru(?:po)?[^\n]*?[:|-][ \t]*",
            "\nsms\n",
        ),
        RewriteRule::replace(
            "phone-header",
            r"\[[^\]\n]+\][ \t]+\+\d+(?:[ \t]+\d+)*:[ \t]*",
            "\nsms\n",
        ),
        RewriteRule::replace(
            "email-header",
            r"\[[^\]\n]+\][ \t]+[\w.%+-]+@[\w.-]+\.[A-Za-z]{2,}:?[ \t]*",
            "\nsms\n",
        ),
        RewriteRule::replace(
            "sender-header",
            r"(?m)\[[^\]\n]+\][ \t]+[A-Za-z0-9 ]*[:-](?:[ \t]+|$)",
            "\nsms\n",
        ),
        RewriteRule::replace("sms-marker", r"(?mi)^[ \t]*sms\b[ \t]*[:\-]*[ \t]*", "sms\n"),
        RewriteRule::replace("inline-sms", r"(?i)([^\s])[ \t/]+sms\b", "${1}\nsms"),
    ]
});

// ---------------------------------------------------------------------------
// Stage 2: folding

static FOLDING_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::transform("fold-diacritics", fold_diacritics),
        RewriteRule::replace("collapse-blanks", r"[ \t\x{A0}\x{2007}\x{202F}]+", " "),
        RewriteRule::replace("trim-lines", r"(?m)^ +| +$", ""),
        RewriteRule::replace_with(
            "collapse-repeats",
            r"-{2,}|,{2,}|;{2,}|_{2,}|\^{2,}|¨{2,}|\.{2,}|/{2,}|={2,}|\*{2,}|\+{2,}",
            first_char,
        ),
        RewriteRule::replace("o-after-digit", r"(\d)[oO]", "${1}0").repeat(5),
        RewriteRule::replace("o-before-digit", r"[oO](\d)", "0${1}").repeat(5),
        RewriteRule::replace("dollar-as-slash", r"\$", "/"),
    ]
});

/// Strip accents: á -> a, Ñ -> N
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn first_char(caps: &Captures) -> String {
    caps[0].chars().next().map(String::from).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stage 3: keywords

static KEYWORD_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::replace("terminal-keyword", r"(?i)(^|[^a-z])ter[a-z]*", "${1}TerminaL"),
        RewriteRule::replace("line-keyword", r"(?i)(^|[^a-z])lin[a-z]*", "${1}Linea"),
        RewriteRule::replace("pair-keyword", r"(?i)(^|[^a-z])(?:pj\b|par[a-z]*)", "${1}Pareja"),
        RewriteRule::replace("decade-keyword", r"(?i)(^|[^a-z])dec[a-z]*", "${1}Decena"),
        RewriteRule::replace_with("short-keywords", r"(?m)^([lLtTpPdD])\b", expand_short_keyword),
        RewriteRule::replace(
            "keyword-separator",
            r"(Linea|TerminaL|Pareja|Decena)[-.,:;=_/+* ]+",
            "${1}-",
        ),
        RewriteRule::transform("y-joins", join_y_connectors),
        RewriteRule::replace(
            "number-connector",
            &format!(r"(?i)(\d){SEP}*(?:con|c|de|von|com|cin|vin){SEP}*(\d)"),
            "${1}-con-${2}",
        )
        .repeat(5),
        RewriteRule::replace(
            "keyword-connector",
            &format!(r"(?i)(Linea|TerminaL|Pareja|Decena)-(?:con|c|de|von|com|cin|vin){SEP}*(\d)"),
            "${1}-con-${2}",
        ),
        RewriteRule::replace(
            "range-connector",
            &format!(r"(?i)(\d){SEP}*al{SEP}*(\d)"),
            "${1}-aL-${2}",
        )
        .repeat(5),
    ]
});

fn expand_short_keyword(caps: &Captures) -> String {
    match caps[1].to_ascii_lowercase().as_str() {
        "l" => "Linea",
        "t" => "TerminaL",
        "p" => "Pareja",
        _ => "Decena",
    }
    .to_string()
}

static Y_JOIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)[ .\-_,]*[yY][ .\-_,]*(\d)").unwrap());
static LINE_HEADS_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Linea-(?:\d+[ .\-_,]*[yY][ .\-_,]*)*\d+$").unwrap());

/// Numbers joined by "y": a dash list, except inside a Linea bet where each
/// head stays a separate line bet (`Linea-10-y-20`). The Linea bet may sit
/// anywhere on the line, since bets are not split apart yet.
pub fn join_y_connectors(text: &str) -> String {
    text.split('\n')
        .map(|line| fixed_point(line, 5, join_y_in_line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_y_in_line(line: &str) -> String {
    Y_JOIN
        .replace_all(line, |caps: &Captures| {
            let head_end = caps.get(1).map_or(0, |m| m.end());
            let joiner = if LINE_HEADS_TAIL.is_match(&line[..head_end]) {
                "-y-"
            } else {
                "-"
            };
            format!("{}{}{}", &caps[1], joiner, &caps[2])
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Stage 4: structure
//
// Every rule inserts a line break between a complete bet (left capture) and
// the start of the next one (right capture). Grouped by the separator the
// left-hand bet uses.

const STRUCTURAL_PATTERNS: &[(&str, &str)] = &[
    // "=" separated bets
    ("eq-slash-bet", r"(\d+=\d+)/ ?(\d+[=/.\-]\d+)"),
    ("eq-slash-range", r"(\d+=\d+)/ ?(\d+-aL-\d+)"),
    ("eq-space-bet", r"(\d+=\d+) (\d+[=.\-:;]\d+)"),
    ("eq-semicolon-bet", r"(\d+=\d+);(\d+=\d+)"),
    ("eq-space-con", r"(\d+=\d+) (\d+-con-)"),
    (
        "eq-keyword",
        r"(\d+=\d+)(?: |\.|\. | ,|, )((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    // "-" separated bets
    ("dash-bet", r"(\d+-\d+)(?: |, |,| ,|/,|/\. |\. )(\d+-\d+)"),
    (
        "dash-keyword",
        r"(\d+-\d+)(?: |, )((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    ("dash-semicolon", r"(\d+-\d+) (\d+;\d+)"),
    ("dash-del", r"(\d+-\d+) ((?i:del) \d+)"),
    ("dash-con", r"(\d+-\d+) (\d+-con-\d+)"),
    ("dash-slash-eq", r"(\d+-\d+)/(\d+=\d+)"),
    // "," separated bets
    (
        "comma-keyword",
        r"(\d+,\d+) ((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    ("comma-bet", r"(\d+,\d+)(?: |/)(\d+[=;:\-,]\d+)"),
    // "-aL-" ranges
    (
        "range-eq-next",
        r"(\d+-aL-\d+=\d+)(?:/| )(\d+=\d+|\d+/\d+|\d+-aL-\d+|(?:Linea|TerminaL|Pareja)-\d+)",
    ),
    (
        "range-keyword",
        r"(\d+-aL-\d+) ((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    // "." separated bets
    ("dot-bet", r"(\d+\.\d+)(?:\. | )(\d+[.=\-:;]\d+)"),
    (
        "dot-keyword",
        r"(\d+\.\d+) ((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    // space separated heads
    ("space-keyword", r"(\d+ \d+) ((?:Linea|TerminaL)-\d+)"),
    // ":" separated bets
    ("colon-bet", r"(\d+:\d+)[ ,.;/]+(\d+:\d+)"),
    (
        "colon-keyword",
        r"(\d+:\d+) ((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    // ";" separated bets
    ("semicolon-bet", r"(\d+;\d+)(?:, | ,| )(\d+;\d+)"),
    (
        "semicolon-keyword",
        r"(\d+;\d+) ((?:Linea|TerminaL|Pareja|Decena)-(?:con-)?\d+)",
    ),
    ("semicolon-next", r"(\d+;\d+)(?: |/)(\d+[-=:]\d+)"),
    // keyword bets followed by something else
    ("line-then-bet", r"(Linea-\d+-\d+) (\d+[-.=]\d+)"),
    ("line-comma-pair", r"(Linea-\d+,\d+) (Pareja-\d+)"),
    (
        "line-con-next",
        r"(Linea-\d+-con-\d+) (\d+-\d+|\d+-con-\d+|(?:TerminaL|Pareja|Decena)-\d+)",
    ),
    (
        "terminal-then-bet",
        r"(TerminaL-\d+-\d+) (\d+-\d+|\d+-con-\d+|(?:Linea|TerminaL|Pareja|Decena)-\d+)",
    ),
    ("terminal-eq-next", r"(TerminaL-\d+=\d+) (\d+=\d+|Pareja-\d+)"),
    (
        "pair-then-bet",
        r"(Pareja-(?:con-)?\d+) (\d+-\d+|\d+=\d+|(?:Linea|TerminaL|Decena)-\d+)",
    ),
    (
        "decade-then-bet",
        r"(Decena-\d+-(?:con-)?\d+) (\d+[-=.,;:]\d+|(?:Linea|TerminaL|Pareja)-\d+)",
    ),
    // abbreviated keywords left mid-line
    ("short-then-short", r"([LT]-\d+-\d+) ([LT]-\d+-\d+)"),
    (
        "keyword-then-short",
        r"((?:Linea|TerminaL|Pareja|Decena)-[\d-]*\d) ([LTPD]-\d+)",
    ),
    ("bet-then-short", r"(\d+[-=.,;:]\d+) ([LTPD]-\d+)"),
    // an amount after -con- closes the bet
    (
        "con-amount-next",
        r"(-con-\d+)[ ,;/]+(\d|[LTPDltpd]-\d|(?:Linea|TerminaL|Pareja|Decena)\b)",
    ),
];

static STRUCTURAL_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    STRUCTURAL_PATTERNS
        .iter()
        .map(|&(name, pattern)| RewriteRule::replace(name, pattern, "${1}\n${2}"))
        .collect()
});

// ---------------------------------------------------------------------------
// Stage 5: tidy

static TIDY_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::replace("space-around-separators", r" *([-,;:=./]) *", "${1}"),
        RewriteRule::replace("symbols-to-dash", r"[*+_¨^=':]", "-"),
        RewriteRule::replace("collapse-dashes", r"-{2,}", "-"),
    ]
});

// ---------------------------------------------------------------------------
// Stage 6: boundaries

static BOUNDARY_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::transform("pad-single-digits", pad_isolated_digits),
        RewriteRule::replace("digit-letter", r"(\d)([A-Za-z])", "${1} ${2}"),
        RewriteRule::replace("letter-digit", r"([A-Za-z])(\d)", "${1}-${2}"),
    ]
});

/// Zero-pad every lone digit that is not glued to a letter on its left
/// or to another digit on either side ("5-10" -> "05-10", "t5" untouched).
pub fn pad_isolated_digits(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let free_left = prev.map_or(true, |p| !p.is_ascii_digit() && !p.is_ascii_alphabetic());
            let free_right = next.map_or(true, |n| !n.is_ascii_digit());
            if free_left && free_right {
                out.push('0');
            }
        }
        out.push(c);
    }

    out
}

// ---------------------------------------------------------------------------
// Stage 7: cleanup

static CLEANUP_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::replace("drop-totals", r"(?mi)^total\b[^\n]*$", ""),
        RewriteRule::replace("leading-symbols", r"(?m)^[-=*#.,;:/ ]+", ""),
        RewriteRule::replace_with("leading-chatter", r"(?m)^([A-Za-z]\w*) ?", keep_bet_word).repeat(10),
        RewriteRule::replace("trailing-separators", r"(?m)[-=./,;: ]+$", ""),
        RewriteRule::replace("trim-lines", r"(?m)^ +| +$", ""),
        RewriteRule::replace("blank-lines", r"\n{2,}", "\n"),
        RewriteRule::transform("trim", |t| t.trim().to_string()),
    ]
});

/// A line may only open with a word that can start a bet
fn keep_bet_word(caps: &Captures) -> String {
    let word = caps[1].to_ascii_lowercase();
    let allowed = word.starts_with("no")
        || matches!(word.chars().next(), Some('d' | 'p' | 'l' | 't' | 's' | 'c' | 'o'));
    if allowed {
        caps[0].to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_lines_unchanged() {
        assert_eq!(normalize("Linea-10-50"), "Linea-10-50");
        assert_eq!(normalize("Pareja-10"), "Pareja-10");
        assert_eq!(normalize("37,98,1000"), "37,98,1000");
    }

    #[test]
    fn test_terminal_keyword_and_padding() {
        assert_eq!(normalize("Terminal-5-10"), "TerminaL-05-10");
        assert_eq!(normalize("TERMINALES 5 con 10"), "TerminaL-05-con-10");
    }

    #[test]
    fn test_range_connector() {
        assert_eq!(normalize("5-al-25-con-10"), "05-aL-25-con-10");
        assert_eq!(normalize("del 5 al 10 con 5"), "del 05-aL-10-con-05");
    }

    #[test]
    fn test_connector_words() {
        assert_eq!(normalize("linea 10 con 50"), "Linea-10-con-50");
        assert_eq!(normalize("Parejas de 20"), "Pareja-con-20");
        assert_eq!(normalize("10 c 100"), "10-con-100");
        assert_eq!(normalize("10 vin 100"), "10-con-100");
    }

    #[test]
    fn test_short_keywords_at_line_start() {
        assert_eq!(normalize("L-10-50"), "Linea-10-50");
        assert_eq!(normalize("p 10"), "Pareja-10");
        assert_eq!(normalize("t5 con 10"), "TerminaL-05-con-10");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(fold_diacritics("Línea Ñandú"), "Linea Nandu");
        assert_eq!(normalize("Línea 20 con 5"), "Linea-20-con-05");
    }

    #[test]
    fn test_repeated_punctuation() {
        assert_eq!(normalize("10---50"), "10-50");
        assert_eq!(normalize("37,,98,,,1000"), "37,98,1000");
    }

    #[test]
    fn test_o_read_as_zero() {
        assert_eq!(normalize("1o-5o"), "10-50");
    }

    #[test]
    fn test_y_joins() {
        assert_eq!(normalize("37 y 20 y 55 con 10"), "37-20-55-con-10");
        assert_eq!(normalize("linea 10 y 20 con 5"), "Linea-10-y-20-con-05");
        assert_eq!(normalize("terminal 5 y 6 con 10"), "TerminaL-05-06-con-10");
    }

    #[test]
    fn test_whatsapp_header_becomes_sms() {
        let raw = "[12/03/2024 10:15 AM] Juan 10% Grupo Norte: 10-50\n20-30";
        assert_eq!(normalize(raw), "sms\n10-50\n20-30");
    }

    #[test]
    fn test_sender_header_becomes_sms() {
        let raw = "[10:15, 12/3/2024] Maria: 25-10";
        assert_eq!(normalize(raw), "sms\n25-10");
    }

    #[test]
    fn test_inline_sms_moves_down() {
        assert_eq!(normalize("Pareja-10 sms"), "Pareja-10\nsms");
    }

    #[test]
    fn test_concatenated_bets_split() {
        assert_eq!(normalize("10-50 20-30 40-60"), "10-50\n20-30\n40-60");
        assert_eq!(normalize("10=50/20=30"), "10-50\n20-30");
        assert_eq!(normalize("10-50, Linea-20-5"), "10-50\nLinea-20-05");
        assert_eq!(normalize("Pareja-10 25-10"), "Pareja-10\n25-10");
    }

    #[test]
    fn test_amount_after_con_closes_bet() {
        assert_eq!(normalize("linea 10 con 50 t5 con 10"), "Linea-10-con-50\nTerminaL-05-con-10");
    }

    #[test]
    fn test_chatter_and_totals_removed() {
        assert_eq!(normalize("Buenas 10-50"), "10-50");
        assert_eq!(normalize("10-50\nTotal: 500"), "10-50");
    }

    #[test]
    fn test_trailing_separators_removed() {
        assert_eq!(normalize("10-50/"), "10-50");
        assert_eq!(normalize("10-50 $"), "10-50");
    }

    #[test]
    fn test_pad_isolated_digits() {
        assert_eq!(pad_isolated_digits("5-10"), "05-10");
        assert_eq!(pad_isolated_digits("t5"), "t5");
        assert_eq!(pad_isolated_digits("5pareja"), "05pareja");
        assert_eq!(pad_isolated_digits("123"), "123");
        assert_eq!(pad_isolated_digits("1 2"), "01 02");
    }

    #[test]
    fn test_join_y_connectors() {
        assert_eq!(join_y_connectors("37 y 20"), "37-20");
        assert_eq!(join_y_connectors("Linea-10 y 20"), "Linea-10-y-20");
        assert_eq!(join_y_connectors("1 y 2 y 3"), "1-2-3");
        assert_eq!(join_y_connectors("Linea-10 y 20 y 30"), "Linea-10-y-20-y-30");
    }

    #[test]
    fn test_join_y_connectors_mid_line() {
        assert_eq!(
            join_y_connectors("10-50 Linea-00 y 20 con 5"),
            "10-50 Linea-00-y-20 con 5"
        );
        assert_eq!(
            join_y_connectors("37 y 20 Linea-10 y 30"),
            "37-20 Linea-10-y-30"
        );
    }

    #[test]
    fn test_repair_structure_chains() {
        let text = "10-50 20-30 40-60 70-80";
        assert_eq!(repair_structure(text, 15), "10-50\n20-30\n40-60\n70-80");
    }

    #[test]
    fn test_repair_structure_respects_cap() {
        let text = "10-50 20-30 40-60 70-80";
        // one sweep splits the first pair of every overlapping chain
        assert_eq!(repair_structure(text, 1), "10-50\n20-30 40-60\n70-80");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }

    #[test]
    fn test_idempotent_on_messy_input() {
        let raw = "[12/03/2024 10:15 AM] Juan 10% Grupo Norte: linea 10 con 50 t5 con 10\nParejas de 20\n5 al 25 c 10";
        let once = normalize(raw);
        assert_eq!(
            once,
            "sms\nLinea-10-con-50\nTerminaL-05-con-10\nPareja-con-20\n05-aL-25-con-10"
        );
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_idempotent_on_canonical_output() {
        for raw in ["Linea-10-50", "TerminaL-05-06-con-10", "sms", "del 05-aL-10-con-05", "37,98,1000"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not a fixed point: {}", raw);
        }
    }
}
