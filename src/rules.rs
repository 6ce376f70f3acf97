// Rewrite rules and the driver that applies them in order

use regex::{Captures, Regex};
use std::fmt;

/// How often a rule fires within a single pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// One replace-all sweep
    Once,
    /// Sweep until the text stops changing, at most this many times
    UpTo(usize),
}

enum Action {
    Replace { pattern: Regex, template: String },
    ReplaceWith {
        pattern: Regex,
        func: fn(&Captures) -> String,
    },
    Transform(fn(&str) -> String),
}

/// A named (pattern, replacement) pair with its repeat policy
pub struct RewriteRule {
    name: &'static str,
    action: Action,
    repeat: Repeat,
}

fn compile(name: &str, pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("rule '{}' has a bad pattern: {}", name, e))
}

impl RewriteRule {
    /// Regex replacement with a `$1`-style template
    pub fn replace(name: &'static str, pattern: &str, template: &str) -> Self {
        Self {
            name,
            action: Action::Replace {
                pattern: compile(name, pattern),
                template: template.to_string(),
            },
            repeat: Repeat::Once,
        }
    }

    /// Regex replacement computed from the captures
    pub fn replace_with(name: &'static str, pattern: &str, func: fn(&Captures) -> String) -> Self {
        Self {
            name,
            action: Action::ReplaceWith {
                pattern: compile(name, pattern),
                func,
            },
            repeat: Repeat::Once,
        }
    }

    /// Whole-text transformation that a regex cannot express
    pub fn transform(name: &'static str, func: fn(&str) -> String) -> Self {
        Self {
            name,
            action: Action::Transform(func),
            repeat: Repeat::Once,
        }
    }

    /// Re-apply until stable, at most `cap` sweeps
    pub fn repeat(mut self, cap: usize) -> Self {
        self.repeat = Repeat::UpTo(cap.max(1));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> Repeat {
        self.repeat
    }

    fn sweep(&self, text: &str) -> String {
        match &self.action {
            Action::Replace { pattern, template } => {
                pattern.replace_all(text, template.as_str()).into_owned()
            }
            Action::ReplaceWith { pattern, func } => {
                pattern.replace_all(text, |caps: &Captures| func(caps)).into_owned()
            }
            Action::Transform(func) => func(text),
        }
    }

    /// Apply this rule according to its repeat policy
    pub fn apply(&self, text: &str) -> String {
        match self.repeat {
            Repeat::Once => self.sweep(text),
            Repeat::UpTo(cap) => fixed_point(text, cap, |t| self.sweep(t)),
        }
    }
}

impl fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.action {
            Action::Replace { pattern, .. } | Action::ReplaceWith { pattern, .. } => pattern.as_str(),
            Action::Transform(_) => "<transform>",
        };
        f.debug_struct("RewriteRule")
            .field("name", &self.name)
            .field("pattern", &kind)
            .field("repeat", &self.repeat)
            .finish()
    }
}

/// Apply every rule of a table once, in order
pub fn apply_rules(text: &str, rules: &[RewriteRule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Run `step` until its output equals its input or `cap` steps have run
pub fn fixed_point<F>(text: &str, cap: usize, step: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut current = text.to_string();
    for _ in 0..cap {
        let next = step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}
