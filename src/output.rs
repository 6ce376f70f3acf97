// src/output.rs
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal sink for the CLI. Reports go to stdout and are never silenced;
/// progress, diagnostics and warnings go to stderr.
pub struct Output {
    quiet: bool,
    verbose: bool,
    report: Term,
    diag: Term,
}

impl Output {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            report: Term::stdout(),
            diag: Term::stderr(),
        }
    }

    pub fn print(&self, msg: &str) {
        let _ = self.report.write_line(msg);
    }

    pub fn print_all<I>(&self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.print(&line);
        }
    }

    /// Separator printed before each slip's report in multi-slip runs.
    pub fn heading(&self, label: &str) {
        self.print(&format!("== {} ==", style(label).bold()));
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            let _ = self.diag.write_line(msg);
        }
    }

    pub fn verbose(&self, msg: &str) {
        if self.verbose && !self.quiet {
            let _ = self.diag.write_line(&format!("  {}", style(msg).dim()));
        }
    }

    /// Warnings survive --quiet: exposure alerts are part of the result.
    pub fn warning(&self, msg: &str) {
        let _ = self
            .diag
            .write_line(&format!("{}: {}", style("Warning").yellow().bold(), msg));
    }

    pub fn error(&self, msg: &str) {
        let _ = self
            .diag
            .write_line(&format!("{}: {}", style("Error").red().bold(), msg));
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            let _ = self.diag.write_line(&format!("{}", style(msg).green()));
        }
    }

    /// Progress over a batch of slips, labelled with the slip being read.
    /// Hidden when quiet or when there is nothing to track.
    pub fn progress_bar(&self, slips: usize) -> ProgressBar {
        if self.quiet || slips < 2 {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(slips as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  [{bar:30.green/white}] {pos}/{len} slips {wide_msg:.dim}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb
    }
}
