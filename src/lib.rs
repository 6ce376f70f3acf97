//! Normalization and settlement of free-text betting slips for two-digit
//! number lotteries.
//!
//! Raw pasted text goes through [`normalizer::normalize`], which yields one
//! canonical bet per line. [`classifier::analyze`] then matches every line
//! against the shape grammars, evaluates it against an optional winning
//! number and folds the batch into totals and per-number exposure.

pub mod annotate;
pub mod classifier;
pub mod cli;
pub mod evaluator;
pub mod grammar;
pub mod normalizer;
pub mod numbers;
pub mod output;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod types;

pub use classifier::{analyze, analyze_with, process, Analysis};
pub use normalizer::{normalize, normalize_with};
pub use types::{BetEvaluation, BetLine, Limits, ShapeTag};
