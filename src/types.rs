use std::collections::BTreeMap;

/// Stake amounts, in whatever currency unit the slip uses
pub type Amount = u64;

/// Covered number (0-99) to the stake riding on it
pub type Coverage = BTreeMap<u8, Amount>;

/// Stake above which a number is flagged for the operator
pub const RISK_THRESHOLD: Amount = 5000;

/// Cap on full passes of the structural-repair table
pub const REPAIR_ITERATIONS: usize = 15;

/// Cap on outer normalization passes
pub const MAX_PASSES: usize = 15;

/// Bet shape recognized for a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    /// One or two plain numbers followed by an amount (25-10)
    NumberRange,
    /// Linea keyword with one or two heads
    Line,
    /// Linea keyword with heads joined by "y"
    LineWithAnd,
    /// Decena keyword with a single head
    Decade,
    /// Decena keyword with several heads
    DecadeWithAnd,
    /// TerminaL keyword with a single head digit
    Terminal,
    /// TerminaL keyword with several head digits
    TerminalMulti,
    /// Head digit "al" end number (5 al 95)
    TerminalRange,
    /// Pareja keyword and an amount
    Pair,
    /// Doubles written as a range (00 al 99)
    PairRange,
    /// Inclusive numeric range (del 5 al 25)
    NumberToNumber,
    /// Catch-all list of numbers with a trailing amount
    GenericList,
    /// Chat envelope marker, carries no wager
    SmsMarker,
    /// Line no grammar accepts
    Invalid,
}

impl ShapeTag {
    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ShapeTag::NumberRange => "Number",
            ShapeTag::Line => "Line",
            ShapeTag::LineWithAnd => "Line with y",
            ShapeTag::Decade => "Decade",
            ShapeTag::DecadeWithAnd => "Decade with y",
            ShapeTag::Terminal => "Terminal",
            ShapeTag::TerminalMulti => "Terminal multi",
            ShapeTag::TerminalRange => "Terminal al",
            ShapeTag::Pair => "Pair",
            ShapeTag::PairRange => "Pair al",
            ShapeTag::NumberToNumber => "Number al number",
            ShapeTag::GenericList => "List",
            ShapeTag::SmsMarker => "SMS",
            ShapeTag::Invalid => "Invalid",
        }
    }
}

/// A single line of a slip, after cleanup, with the shape it was matched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetLine {
    /// Line exactly as it appeared in the batch
    pub raw: String,
    /// Line after whitespace/separator cleanup, what the grammars see
    pub cleaned: String,
    /// Recognized shape
    pub shape: ShapeTag,
}

/// What one line is worth against a winning number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BetEvaluation {
    pub coverage: Coverage,
    pub total_wagered: Amount,
    pub prize: Amount,
}

/// Tunable limits for one normalization/analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub risk_threshold: Amount,
    pub repair_iterations: usize,
    pub max_passes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            risk_threshold: RISK_THRESHOLD,
            repair_iterations: REPAIR_ITERATIONS,
            max_passes: MAX_PASSES,
        }
    }
}

impl Limits {
    pub fn with_threshold(threshold: Amount) -> Self {
        Self {
            risk_threshold: threshold,
            ..Self::default()
        }
    }
}
