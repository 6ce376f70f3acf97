// Hints for invalid lines: which numbers are out of range and where

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-/*+,;:._¨^=]+").unwrap());

/// Largest number a head may take
const MAX_HEAD: u64 = 100;

/// A head above 100 and its 1-based position among the line's numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oversized {
    pub value: u64,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub line: String,
    pub oversized: Vec<Oversized>,
}

impl Annotation {
    pub fn has_hints(&self) -> bool {
        !self.oversized.is_empty()
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hints: Vec<String> = self
            .oversized
            .iter()
            .map(|o| format!("{} (position {})", o.value, o.position))
            .collect();
        write!(f, "numbers above {}: {}", MAX_HEAD, hints.join(", "))
    }
}

/// Find heads above 100. The last token is taken as the amount and never
/// reported.
pub fn annotate(line: &str) -> Annotation {
    let mut tokens: Vec<&str> = TOKEN_SPLIT.split(line.trim()).filter(|t| !t.is_empty()).collect();
    tokens.pop();

    let oversized = tokens
        .iter()
        .filter_map(|t| t.parse::<u64>().ok())
        .enumerate()
        .filter(|(_, value)| *value > MAX_HEAD)
        .map(|(i, value)| Oversized {
            value,
            position: i + 1,
        })
        .collect();

    Annotation {
        line: line.to_string(),
        oversized,
    }
}
