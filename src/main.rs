use anyhow::{Context, Result};
use betslip::classifier::{self, Analysis};
use betslip::cli::Cli;
use betslip::normalizer::normalize_with;
use betslip::output::Output;
use betslip::report::{self, group_thousands};
use betslip::scanner;
use clap::Parser;
use std::fs;
use std::io::{self, Read};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let output = Output::new(cli.quiet, cli.verbose);

    if let Err(e) = run(&cli, &output) {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &Output) -> Result<()> {
    if cli.reads_stdin() {
        run_stdin(cli, output)
    } else {
        run_files(cli, output)
    }
}

fn run_stdin(cli: &Cli, output: &Output) -> Result<()> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read slip from stdin")?;

    process_slip(cli, output, None, &raw);
    Ok(())
}

fn run_files(cli: &Cli, output: &Output) -> Result<()> {
    output.info(&format!("Scanning {}...", cli.target.display()));

    let root = scanner::slip_root(&cli.target);
    let slips = scanner::collect_slips(&cli.target, cli.destination.as_deref())
        .with_context(|| format!("Failed to scan {}", cli.target.display()))?;

    if slips.is_empty() {
        output.info("No slips found");
        return Ok(());
    }

    output.info(&format!("  Found {} slips", slips.len()));

    if let Some(dest) = &cli.destination {
        fs::create_dir_all(dest).context("Failed to create destination directory")?;
    }

    let labelled = slips.len() > 1;
    let pb = output.progress_bar(slips.len());
    let mut processed = 0;
    let mut grand_sold: u64 = 0;
    let mut grand_prize: u64 = 0;

    for path in &slips {
        let label = scanner::slip_label(path, &root);
        pb.set_message(label.clone());
        pb.inc(1);

        let raw = match scanner::read_slip(path) {
            Ok(text) => text,
            Err(e) => {
                pb.suspend(|| output.warning(&format!("Skipping {}: {:#}", path.display(), e)));
                continue;
            }
        };

        let (normalized, analysis) =
            pb.suspend(|| process_slip(cli, output, labelled.then_some(label.as_str()), &raw));

        if let Some(dest) = &cli.destination {
            let out_path = scanner::mirrored_path(path, &root, dest);
            scanner::write_normalized(&out_path, &normalized)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            output.verbose(&format!("Wrote {}", out_path.display()));
        }

        if let Some(analysis) = analysis {
            grand_sold = grand_sold.saturating_add(analysis.total_wagered);
            grand_prize = grand_prize.saturating_add(analysis.total_prize);
        }
        processed += 1;
    }

    pb.finish_and_clear();

    if processed > 1 && !cli.normalize_only {
        let mut total = format!("Grand total sold: {}", group_thousands(grand_sold));
        if cli.winning.is_some() {
            total.push_str(&format!(" - Total prize: {}", group_thousands(grand_prize)));
        }
        output.print(&total);
    }
    output.success(&format!("Done: processed {} slips", processed));

    Ok(())
}

/// Normalize one slip and print its report. Returns the normalized text and,
/// unless only normalizing, the analysis.
fn process_slip(
    cli: &Cli,
    output: &Output,
    label: Option<&str>,
    raw: &str,
) -> (String, Option<Analysis>) {
    let limits = cli.limits();

    if let Some(label) = label {
        output.heading(label);
    }

    if cli.normalize_only {
        let normalized = normalize_with(raw, &limits);
        if !normalized.is_empty() {
            output.print(&normalized);
        }
        return (normalized, None);
    }

    let (normalized, analysis) = classifier::process(raw, cli.winning, &limits);
    print_report(cli, output, &analysis);
    (normalized, Some(analysis))
}

fn print_report(cli: &Cli, output: &Output, analysis: &Analysis) {
    let terms = cli.terms();

    for result in &analysis.lines {
        output.verbose(&format!("{} -> {}", result.line.raw, result.line.shape.label()));
    }

    if cli.detail {
        output.print_all(report::detail(analysis, cli.winning));
    }

    output.print(&report::summary(analysis, cli.winning, &terms));
    if cli.winning.is_some() {
        output.print(&report::settlement_breakdown(analysis, &terms));
    }

    let invalid = report::invalid_lines(analysis);
    if !invalid.is_empty() {
        output.print(&format!("Invalid lines ({}):", analysis.invalid_lines.len()));
        output.print_all(invalid);
    }

    for warning in report::exposure_warnings(analysis) {
        output.warning(&warning);
    }
}
