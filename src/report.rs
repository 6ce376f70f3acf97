// Rendering an analysis for the terminal

use crate::annotate::annotate;
use crate::classifier::{Analysis, LineResult, Outcome};
use crate::numbers::pad2;
use crate::types::{Amount, BetEvaluation};
use console::style;

/// Seller commission when none is given, in percent
pub const DEFAULT_COMMISSION: f64 = 10.0;

/// Paid out per unit of prize when none is given
pub const DEFAULT_PAYOUT: Amount = 1000;

/// Commercial terms used to settle a slip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terms {
    pub commission_pct: f64,
    pub payout: Amount,
}

impl Default for Terms {
    fn default() -> Self {
        Self {
            commission_pct: DEFAULT_COMMISSION,
            payout: DEFAULT_PAYOUT,
        }
    }
}

/// Money owed once the winning number is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub commission: f64,
    pub delivered: f64,
    pub prizes_paid: f64,
    pub balance: f64,
}

impl Settlement {
    pub fn is_profit(&self) -> bool {
        self.balance >= 0.0
    }
}

pub fn settle(total_wagered: Amount, total_prize: Amount, terms: &Terms) -> Settlement {
    let sold = total_wagered as f64;
    let commission = sold * terms.commission_pct / 100.0;
    let delivered = sold - commission;
    let prizes_paid = total_prize as f64 * terms.payout as f64;
    Settlement {
        commission,
        delivered,
        prizes_paid,
        balance: delivered - prizes_paid,
    }
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn money(value: f64) -> String {
    group_thousands(value.abs().round() as u64)
}

/// One-line totals, with prize and balance once a winning number is set
pub fn summary(analysis: &Analysis, winning: Option<u8>, terms: &Terms) -> String {
    let sold = format!("Total sold: {}", group_thousands(analysis.total_wagered));
    let Some(winning) = winning else {
        return sold;
    };

    let settlement = settle(analysis.total_wagered, analysis.total_prize, terms);
    let balance = if settlement.is_profit() {
        style(format!("Profit: {}", money(settlement.balance))).green()
    } else {
        style(format!("Loss: {}", money(settlement.balance))).red()
    };

    format!(
        "{} - Winning number: {} - Total prize: {} - {}",
        sold,
        pad2(winning),
        group_thousands(analysis.total_prize),
        balance
    )
}

/// Breakdown of the settlement behind the balance in [`summary`]
pub fn settlement_breakdown(analysis: &Analysis, terms: &Terms) -> String {
    let settlement = settle(analysis.total_wagered, analysis.total_prize, terms);
    format!(
        "Commission ({}%): {} - Delivered: {} - Prizes paid: {}",
        terms.commission_pct,
        money(settlement.commission),
        money(settlement.delivered),
        money(settlement.prizes_paid)
    )
}

fn covered_numbers(eval: &BetEvaluation, winning: Option<u8>) -> String {
    eval.coverage
        .iter()
        .map(|(&number, &amount)| {
            let entry = format!("{} con {}", pad2(number), amount);
            if Some(number) == winning {
                style(entry).green().bold().to_string()
            } else {
                entry
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single line of the per-line breakdown
pub fn detail_line(result: &LineResult, winning: Option<u8>) -> String {
    match &result.outcome {
        Outcome::Marker => format!("{} => sms", result.line.raw),
        Outcome::Valid(eval) => format!(
            "{} => {} [{}, sold {}, prize {}]",
            result.line.cleaned,
            covered_numbers(eval, winning),
            result.line.shape.label(),
            group_thousands(eval.total_wagered),
            group_thousands(eval.prize)
        ),
        Outcome::Invalid(reason) => {
            format!("{} => {}", result.line.raw, style(reason.to_string()).red())
        }
    }
}

pub fn detail(analysis: &Analysis, winning: Option<u8>) -> Vec<String> {
    analysis
        .lines
        .iter()
        .map(|result| detail_line(result, winning))
        .collect()
}

/// Warning text for every number whose stake went above the threshold
pub fn exposure_warnings(analysis: &Analysis) -> Vec<String> {
    let threshold = group_thousands(analysis.exposure.threshold());
    analysis
        .flagged()
        .iter()
        .map(|&number| {
            format!(
                "Number {} exceeds the limit of {}: {}",
                pad2(number),
                threshold,
                group_thousands(analysis.exposure.stake(number))
            )
        })
        .collect()
}

/// Invalid lines with the reason and, where there is one, a hint
pub fn invalid_lines(analysis: &Analysis) -> Vec<String> {
    let mut out = Vec::new();
    for result in analysis.lines.iter().filter(|r| r.is_invalid()) {
        let Outcome::Invalid(reason) = &result.outcome else {
            continue;
        };
        out.push(format!("  {} ({})", result.line.raw, reason));
        let annotation = annotate(&result.line.raw);
        if annotation.has_hints() {
            out.push(format!("    {}", annotation));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::analyze;

    fn plain() {
        console::set_colors_enabled(false);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(5600), "5,600");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_settle_profit() {
        let s = settle(2000, 0, &Terms::default());
        assert_eq!(s.commission, 200.0);
        assert_eq!(s.delivered, 1800.0);
        assert_eq!(s.prizes_paid, 0.0);
        assert!(s.is_profit());
    }

    #[test]
    fn test_settle_loss() {
        let terms = Terms {
            commission_pct: 15.0,
            payout: 80,
        };
        let s = settle(1000, 50, &terms);
        assert_eq!(s.delivered, 850.0);
        assert_eq!(s.prizes_paid, 4000.0);
        assert_eq!(s.balance, -3150.0);
        assert!(!s.is_profit());
    }

    #[test]
    fn test_summary_without_winning() {
        plain();
        let analysis = analyze("37,98,1000", None);
        assert_eq!(summary(&analysis, None, &Terms::default()), "Total sold: 2,000");
    }

    #[test]
    fn test_summary_with_winning() {
        plain();
        let analysis = analyze("Linea-10-50", Some(15));
        let terms = Terms {
            commission_pct: 10.0,
            payout: 5,
        };
        assert_eq!(
            summary(&analysis, Some(15), &terms),
            "Total sold: 500 - Winning number: 15 - Total prize: 50 - Profit: 200"
        );
        assert_eq!(
            settlement_breakdown(&analysis, &terms),
            "Commission (10%): 50 - Delivered: 450 - Prizes paid: 250"
        );
    }

    #[test]
    fn test_summary_reports_loss() {
        plain();
        let analysis = analyze("Pareja-10", Some(44));
        assert_eq!(
            summary(&analysis, Some(44), &Terms::default()),
            "Total sold: 100 - Winning number: 44 - Total prize: 10 - Loss: 9,910"
        );
    }

    #[test]
    fn test_summary_pads_winning_number() {
        plain();
        let analysis = analyze("Pareja-10", Some(0));
        let text = summary(&analysis, Some(0), &Terms::default());
        assert!(text.contains("Winning number: 00"));
    }

    #[test]
    fn test_detail_lines() {
        plain();
        let analysis = analyze("sms\n37,98,1000\nhola", Some(98));
        let lines = detail(&analysis, Some(98));
        assert_eq!(lines[0], "sms => sms");
        assert_eq!(lines[1], "37,98,1000 => 37 con 1000, 98 con 1000 [List, sold 2,000, prize 1,000]");
        assert_eq!(lines[2], "hola => unrecognized");
    }

    #[test]
    fn test_exposure_warnings() {
        let analysis = analyze("15-3000\n15-2600", None);
        assert_eq!(
            exposure_warnings(&analysis),
            vec!["Number 15 exceeds the limit of 5,000: 5,600"]
        );
    }

    #[test]
    fn test_invalid_lines_with_hints() {
        let analysis = analyze("150-20\n12345\nLinea-10-50", None);
        assert_eq!(
            invalid_lines(&analysis),
            vec![
                "  150-20 (invalid list)",
                "    numbers above 100: 150 (position 1)",
                "  12345 (solitary number)",
            ]
        );
    }
}
