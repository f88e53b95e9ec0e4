//! # Report Builder
//!
//! Shared plain-text layout for calculator reports, so every generator reads
//! the same: a title, sections, aligned key/value lines and bullet lists.
//!
//! ```rust
//! use abacus_core::report::{money, ReportBuilder};
//!
//! let report = ReportBuilder::new("Construction Cost Estimate")
//!     .section("Summary")
//!     .line("Total Cost", money(415_000.0))
//!     .bullets(&["Budget holds a 10% contingency"])
//!     .build();
//! assert!(report.contains("Total Cost"));
//! assert!(report.contains("$415,000.00"));
//! ```

use std::fmt::Write;

/// Accumulates a report line by line.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    output: String,
}

impl ReportBuilder {
    pub fn new(title: &str) -> Self {
        let mut output = String::with_capacity(1_024);
        output.push_str(title);
        output.push('\n');
        output.push_str(&"=".repeat(title.chars().count()));
        output.push('\n');
        Self { output }
    }

    pub fn section(mut self, heading: &str) -> Self {
        let _ = write!(self.output, "\n{}\n{}\n", heading, "-".repeat(heading.chars().count()));
        self
    }

    /// A `label: value` line
    pub fn line(mut self, label: &str, value: impl AsRef<str>) -> Self {
        let _ = writeln!(self.output, "{:<28} {}", format!("{label}:"), value.as_ref());
        self
    }

    /// Free text on its own line
    pub fn paragraph(mut self, text: &str) -> Self {
        let _ = writeln!(self.output, "{text}");
        self
    }

    pub fn bullets<S: AsRef<str>>(mut self, items: &[S]) -> Self {
        for item in items {
            let _ = writeln!(self.output, "  - {}", item.as_ref());
        }
        self
    }

    pub fn build(self) -> String {
        self.output
    }
}

/// `$1,234,567.89`, with a leading minus for negatives
pub fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Percentage with the given decimals, e.g. `12.50%`
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1_000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1_000));
        n /= 1_000;
    }
    groups.reverse();
    groups.join(",")
}
