//! Scraping test-runner output into the CI summary.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Tally of one suite run, summed over every test binary in the output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub ignored: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.ignored
    }

    /// Percentage of the selected cases that passed.
    pub fn pass_rate(&self) -> u32 {
        if self.total() == 0 {
            return 0;
        }
        (self.passed * 100 / self.total()) as u32
    }
}

/// Parse the `test result:` summary lines out of a test-runner report.
pub fn parse_summary(output: &str) -> Result<Summary> {
    let line = Regex::new(r"test result: \w+\. (\d+) passed; (\d+) failed; (\d+) ignored")
        .expect("invalid regex");
    let mut summary = Summary::default();
    let mut matched = false;
    for captures in line.captures_iter(output) {
        matched = true;
        summary.passed += captures[1].parse::<usize>()?;
        summary.failed += captures[2].parse::<usize>()?;
        summary.ignored += captures[3].parse::<usize>()?;
    }
    if !matched {
        bail!("no test result summary found in the runner output");
    }
    Ok(summary)
}

const COLUMNS: [&str; 2] = ["marker", "pass rate"];

/// Append one `marker,pass rate` row, writing the header first when the
/// summary file is new.
pub fn append_summary_row(path: &Path, marker: &str, pass_rate: u32) -> Result<()> {
    let is_new = std::fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::Writer::from_writer(file);
    if is_new {
        writer.write_record(COLUMNS)?;
    }
    writer.write_record([marker, &pass_rate.to_string()])?;
    writer.flush()?;
    Ok(())
}

/// Average the recorded pass rates, append the `All` row, and return the
/// overall rate.
pub fn append_overall_row(path: &Path) -> Result<u32> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("summary not found at {}", path.display()))?;
    let mut total = 0;
    let mut markers = 0;
    for record in reader.records() {
        let record = record?;
        let rate: u32 = record
            .get(1)
            .context("summary row without a pass rate")?
            .parse()?;
        total += rate;
        markers += 1;
    }
    if markers == 0 {
        bail!("summary at {} holds no marker rows", path.display());
    }
    let overall = total / markers;
    append_summary_row(path, "All", overall)?;
    Ok(overall)
}
