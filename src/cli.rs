use crate::numbers::parse_winning;
use crate::report::{Terms, DEFAULT_COMMISSION, DEFAULT_PAYOUT};
use crate::types::{Amount, Limits, RISK_THRESHOLD};
use clap::Parser;
use std::path::PathBuf;

/// Normalize and settle free-text betting slips
#[derive(Parser, Debug)]
#[command(name = "betslip", version, about)]
pub struct Cli {
    /// Slip file, directory of .txt slips, or - to read stdin
    #[arg(required = true)]
    pub target: PathBuf,

    /// Where to write normalized copies of the slips
    #[arg()]
    pub destination: Option<PathBuf>,

    /// Winning number (00-99; 100 is read as 00)
    #[arg(short, long, value_parser = parse_winning)]
    pub winning: Option<u8>,

    /// Flag numbers whose total stake goes above this amount
    #[arg(short, long, default_value_t = RISK_THRESHOLD)]
    pub threshold: Amount,

    /// Print the normalized slip and stop
    #[arg(short, long)]
    pub normalize_only: bool,

    /// List every covered number for each line
    #[arg(short, long)]
    pub detail: bool,

    /// Seller commission, in percent of the amount sold
    #[arg(long, default_value_t = DEFAULT_COMMISSION)]
    pub commission: f64,

    /// Amount paid per unit of prize
    #[arg(long, default_value_t = DEFAULT_PAYOUT)]
    pub payout: Amount,

    /// Suppress progress output, only show reports and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show how each line was classified
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Cli {
    pub fn reads_stdin(&self) -> bool {
        self.target.as_os_str() == "-"
    }

    pub fn limits(&self) -> Limits {
        Limits::with_threshold(self.threshold)
    }

    pub fn terms(&self) -> Terms {
        Terms {
            commission_pct: self.commission,
            payout: self.payout,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.commission) {
            return Err(format!(
                "commission must be between 0 and 100, got {}",
                self.commission
            ));
        }
        if self.reads_stdin() {
            if self.destination.is_some() {
                return Err("a DESTINATION cannot be used when reading from stdin".to_string());
            }
            return Ok(());
        }
        if !self.target.exists() {
            return Err(format!("target does not exist: {}", self.target.display()));
        }
        if !self.target.is_dir() && !self.target.is_file() {
            return Err(format!(
                "target is neither a file nor a directory: {}",
                self.target.display()
            ));
        }
        Ok(())
    }
}
