// Batch analysis: classify every line, evaluate it and fold the results

use crate::evaluator;
use crate::grammar;
use crate::normalizer;
use crate::types::{Amount, BetEvaluation, BetLine, Coverage, Limits, ShapeTag};
use std::collections::BTreeMap;
use std::fmt;

/// Why a line could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// A bare number of three or more digits with no amount
    SolitaryNumber,
    /// No grammar accepts the line
    Unrecognized,
    /// The grammar matched but a numeric check failed
    Rejected(ShapeTag),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::SolitaryNumber => write!(f, "solitary number"),
            InvalidReason::Unrecognized => write!(f, "unrecognized"),
            InvalidReason::Rejected(tag) => write!(f, "invalid {}", tag.label().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// SMS marker, valid but worth nothing
    Marker,
    Valid(BetEvaluation),
    Invalid(InvalidReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    pub line: BetLine,
    pub outcome: Outcome,
}

impl LineResult {
    pub fn evaluation(&self) -> Option<&BetEvaluation> {
        match &self.outcome {
            Outcome::Valid(eval) => Some(eval),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.outcome, Outcome::Invalid(_))
    }
}

/// Cumulative stake per number across a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureMap {
    stakes: BTreeMap<u8, Amount>,
    threshold: Amount,
    flagged: Vec<u8>,
}

impl ExposureMap {
    pub fn new(threshold: Amount) -> Self {
        Self {
            stakes: BTreeMap::new(),
            threshold,
            flagged: Vec::new(),
        }
    }

    /// Add one line's coverage. A number is flagged the first time its
    /// total goes above the threshold and never listed twice.
    pub fn absorb(mut self, coverage: &Coverage) -> Self {
        for (&number, &amount) in coverage {
            let stake = self.stakes.entry(number).or_insert(0);
            *stake = stake.saturating_add(amount);
            if *stake > self.threshold && !self.flagged.contains(&number) {
                self.flagged.push(number);
            }
        }
        self
    }

    pub fn stake(&self, number: u8) -> Amount {
        self.stakes.get(&number).copied().unwrap_or(0)
    }

    pub fn threshold(&self) -> Amount {
        self.threshold
    }

    /// Flagged numbers in the order they crossed the threshold
    pub fn flagged(&self) -> &[u8] {
        &self.flagged
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Amount)> + '_ {
        self.stakes.iter().map(|(&n, &a)| (n, a))
    }
}

/// Everything one batch is worth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub lines: Vec<LineResult>,
    pub total_wagered: Amount,
    pub total_prize: Amount,
    pub exposure: ExposureMap,
    /// Raw text of every invalid line, in order
    pub invalid_lines: Vec<String>,
}

impl Analysis {
    pub fn empty(threshold: Amount) -> Self {
        Self {
            lines: Vec::new(),
            total_wagered: 0,
            total_prize: 0,
            exposure: ExposureMap::new(threshold),
            invalid_lines: Vec::new(),
        }
    }

    /// Combine step of the batch fold
    pub fn absorb(mut self, result: LineResult) -> Self {
        match &result.outcome {
            Outcome::Valid(eval) => {
                self.total_wagered = self.total_wagered.saturating_add(eval.total_wagered);
                self.total_prize = self.total_prize.saturating_add(eval.prize);
                self.exposure = self.exposure.absorb(&eval.coverage);
            }
            Outcome::Invalid(_) => self.invalid_lines.push(result.line.raw.clone()),
            Outcome::Marker => {}
        }
        self.lines.push(result);
        self
    }

    pub fn flagged(&self) -> &[u8] {
        self.exposure.flagged()
    }

    pub fn valid_count(&self) -> usize {
        self.lines.iter().filter(|l| l.evaluation().is_some()).count()
    }

    pub fn marker_count(&self) -> usize {
        self.lines.iter().filter(|l| l.outcome == Outcome::Marker).count()
    }
}

/// Classify and evaluate a single line
pub fn classify_line(raw: &str, winning: Option<u8>) -> LineResult {
    let line = grammar::recognize(raw);
    let outcome = match line.shape {
        ShapeTag::SmsMarker => Outcome::Marker,
        ShapeTag::Invalid if grammar::is_solitary(&line.cleaned) => {
            Outcome::Invalid(InvalidReason::SolitaryNumber)
        }
        ShapeTag::Invalid => Outcome::Invalid(InvalidReason::Unrecognized),
        tag => match evaluator::evaluate(tag, &line.cleaned, winning) {
            Some(eval) => Outcome::Valid(eval),
            None => Outcome::Invalid(InvalidReason::Rejected(tag)),
        },
    };
    LineResult { line, outcome }
}

/// Analyze already normalized text with default limits
pub fn analyze(text: &str, winning: Option<u8>) -> Analysis {
    analyze_with(text, winning, &Limits::default())
}

pub fn analyze_with(text: &str, winning: Option<u8>, limits: &Limits) -> Analysis {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| classify_line(line, winning))
        .fold(Analysis::empty(limits.risk_threshold), Analysis::absorb)
}

/// Normalize raw text, then analyze the result
pub fn process(raw: &str, winning: Option<u8>, limits: &Limits) -> (String, Analysis) {
    let normalized = normalizer::normalize_with(raw, limits);
    let analysis = analyze_with(&normalized, winning, limits);
    (normalized, analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(line: &str, winning: Option<u8>) -> BetEvaluation {
        let analysis = analyze(line, winning);
        assert_eq!(analysis.lines.len(), 1);
        analysis.lines[0]
            .evaluation()
            .cloned()
            .unwrap_or_else(|| panic!("line was not valid: {:?}", analysis.lines[0]))
    }

    #[test]
    fn test_scenario_line() {
        let eval = single("Linea-10-50", Some(15));
        assert_eq!(eval.coverage.keys().copied().collect::<Vec<_>>(), (10..=19).collect::<Vec<_>>());
        assert_eq!(eval.total_wagered, 500);
        assert_eq!(eval.prize, 50);
    }

    #[test]
    fn test_scenario_terminal() {
        let eval = single("Terminal-5-10", Some(25));
        assert_eq!(
            eval.coverage.keys().copied().collect::<Vec<_>>(),
            vec![5, 15, 25, 35, 45, 55, 65, 75, 85, 95]
        );
        assert!(eval.coverage.values().all(|&a| a == 10));
        assert_eq!(eval.total_wagered, 100);
        assert_eq!(eval.prize, 10);
    }

    #[test]
    fn test_scenario_pair() {
        let eval = single("Pareja-10", Some(44));
        assert_eq!(eval.coverage.len(), 10);
        assert_eq!(eval.total_wagered, 100);
        assert_eq!(eval.prize, 10);
    }

    #[test]
    fn test_scenario_number_to_number() {
        let analysis = analyze("5-al-25-con-10", Some(20));
        assert_eq!(analysis.lines[0].line.shape, ShapeTag::NumberToNumber);
        let eval = analysis.lines[0].evaluation().unwrap();
        assert_eq!(eval.coverage.keys().copied().collect::<Vec<_>>(), (5..=25).collect::<Vec<_>>());
        assert_eq!(eval.total_wagered, 210);
        assert_eq!(eval.prize, 10);
    }

    #[test]
    fn test_scenario_generic_list() {
        let analysis = analyze("37,98,1000", Some(98));
        assert_eq!(analysis.lines[0].line.shape, ShapeTag::GenericList);
        let eval = analysis.lines[0].evaluation().unwrap();
        assert_eq!(eval.coverage.get(&37), Some(&1000));
        assert_eq!(eval.coverage.get(&98), Some(&1000));
        assert_eq!(eval.total_wagered, 2000);
        assert_eq!(eval.prize, 1000);
    }

    #[test]
    fn test_scenarios_survive_normalization() {
        let limits = Limits::default();
        for (raw, winning, wagered, prize) in [
            ("Linea-10-50", 15, 500, 50),
            ("Terminal-5-10", 25, 100, 10),
            ("Pareja-10", 44, 100, 10),
            ("5-al-25-con-10", 20, 210, 10),
            ("37,98,1000", 98, 2000, 1000),
        ] {
            let (_, analysis) = process(raw, Some(winning), &limits);
            assert_eq!(analysis.total_wagered, wagered, "{}", raw);
            assert_eq!(analysis.total_prize, prize, "{}", raw);
        }
    }

    #[test]
    fn test_duplicate_heads_regression() {
        let eval = single("10-10-50", Some(10));
        assert_eq!(eval.coverage.len(), 1);
        assert_eq!(eval.coverage.get(&10), Some(&50));
        assert_eq!(eval.total_wagered, 100);
        assert_eq!(eval.prize, 100);
    }

    #[test]
    fn test_solitary_number_is_invalid() {
        let analysis = analyze("12345", None);
        assert_eq!(analysis.lines[0].outcome, Outcome::Invalid(InvalidReason::SolitaryNumber));
        assert_eq!(analysis.invalid_lines, vec!["12345"]);
        assert_eq!(analysis.total_wagered, 0);
    }

    #[test]
    fn test_bad_terminal_head_does_not_fall_through() {
        let analysis = analyze("TerminaL-05-12-10", Some(5));
        assert_eq!(
            analysis.lines[0].outcome,
            Outcome::Invalid(InvalidReason::Rejected(ShapeTag::TerminalMulti))
        );
        assert_eq!(analysis.total_wagered, 0);
        assert_eq!(analysis.total_prize, 0);
    }

    #[test]
    fn test_sms_marker_is_valid_and_free() {
        let analysis = analyze("sms\n10-50", None);
        assert_eq!(analysis.lines[0].outcome, Outcome::Marker);
        assert_eq!(analysis.marker_count(), 1);
        assert_eq!(analysis.valid_count(), 1);
        assert!(analysis.invalid_lines.is_empty());
        assert_eq!(analysis.total_wagered, 50);
    }

    #[test]
    fn test_batch_totals_and_invalid_lines() {
        let text = "Linea-10-50\nhola\n\n  \nPareja-10\n150-20";
        let analysis = analyze(text, Some(22));
        assert_eq!(analysis.lines.len(), 4);
        assert_eq!(analysis.total_wagered, 600);
        assert_eq!(analysis.total_prize, 10);
        assert_eq!(analysis.invalid_lines, vec!["hola", "150-20"]);
        assert_eq!(
            analysis.lines[3].outcome,
            Outcome::Invalid(InvalidReason::Rejected(ShapeTag::GenericList))
        );
    }

    #[test]
    fn test_no_winning_number_means_no_prize() {
        let analysis = analyze("Linea-10-50\nPareja-10", None);
        assert_eq!(analysis.total_prize, 0);
        assert_eq!(analysis.total_wagered, 600);
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyze("", Some(10));
        assert!(analysis.lines.is_empty());
        assert_eq!(analysis.total_wagered, 0);
        assert!(analysis.flagged().is_empty());

        let (normalized, analysis) = process("", None, &Limits::default());
        assert_eq!(normalized, "");
        assert!(analysis.lines.is_empty());
    }

    #[test]
    fn test_exposure_flags_once() {
        let text = "15-3000\n15-2500\n15-100\n16-5000";
        let analysis = analyze(text, None);
        assert_eq!(analysis.exposure.stake(15), 5600);
        assert_eq!(analysis.exposure.stake(16), 5000);
        // 16 sits exactly on the threshold
        assert_eq!(analysis.flagged(), &[15]);
    }

    #[test]
    fn test_exposure_threshold_from_limits() {
        let analysis = analyze_with("Linea-10-50\nLinea-10-60", None, &Limits::with_threshold(100));
        assert_eq!(analysis.exposure.threshold(), 100);
        assert_eq!(analysis.flagged(), (10..=19).collect::<Vec<u8>>().as_slice());
    }

    #[test]
    fn test_exposure_map_absorb() {
        let mut coverage = Coverage::new();
        coverage.insert(7, 40);
        let map = ExposureMap::new(50).absorb(&coverage).absorb(&coverage);
        assert_eq!(map.stake(7), 80);
        assert_eq!(map.flagged(), &[7]);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(7, 80)]);
        assert_eq!(map.stake(8), 0);
    }

    #[test]
    fn test_invalid_reason_display() {
        assert_eq!(InvalidReason::SolitaryNumber.to_string(), "solitary number");
        assert_eq!(InvalidReason::Rejected(ShapeTag::Terminal).to_string(), "invalid terminal");
    }

    #[test]
    fn test_process_pipeline() {
        let raw = "[12/03/2024 10:15 AM] Juan 10% Grupo Norte: linea 10 con 50 t5 con 10\nParejas de 20";
        let (normalized, analysis) = process(raw, Some(25), &Limits::default());
        assert_eq!(normalized, "sms\nLinea-10-con-50\nTerminaL-05-con-10\nPareja-con-20");
        assert_eq!(analysis.marker_count(), 1);
        assert_eq!(analysis.valid_count(), 3);
        assert_eq!(analysis.total_wagered, 500 + 100 + 200);
        assert_eq!(analysis.total_prize, 10);
    }

    #[test]
    fn test_line_with_and_position_independent() {
        let limits = Limits::default();
        let (alone, alone_analysis) = process("linea 00 y 20 con 5", None, &limits);
        let (mixed, mixed_analysis) = process("10-50 linea 00 y 20 con 5", None, &limits);

        assert_eq!(alone, "Linea-00-y-20-con-05");
        assert!(mixed.lines().any(|l| l == "Linea-00-y-20-con-05"), "{}", mixed);

        let line_bet = |analysis: &Analysis| {
            analysis
                .lines
                .iter()
                .find(|r| r.line.shape == ShapeTag::LineWithAnd)
                .and_then(LineResult::evaluation)
                .map(|e| (e.coverage.len(), e.total_wagered))
        };
        assert_eq!(line_bet(&alone_analysis), Some((20, 100)));
        assert_eq!(line_bet(&mixed_analysis), line_bet(&alone_analysis));
    }
}
