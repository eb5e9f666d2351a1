//! Output formatting shared by the subcommands.
//!
//! Text output is meant for people; JSON output is a stable, pretty-printed
//! document written to stdout so it can be piped into other tools.

use std::collections::BTreeSet;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Write `value` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Insert thousands separators, e.g. `12345` -> `12,345`.
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Distance rounded to whole kilometres.
pub fn format_km(km: f64) -> String {
    format!("{} km", format_with_separators(km.max(0.0).round() as u64))
}

/// `LHR -> CDG -> JFK`
pub fn format_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Airlines of each leg, legs separated by ` | `.
pub fn format_airlines(legs: &[BTreeSet<String>]) -> String {
    legs.iter()
        .map(|airlines| {
            airlines
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_are_grouped_by_thousands() {
        assert_eq!(format_with_separators(0), "0");
        assert_eq!(format_with_separators(999), "999");
        assert_eq!(format_with_separators(1_000), "1,000");
        assert_eq!(format_with_separators(1_234_567), "1,234,567");
    }

    #[test]
    fn kilometres_are_rounded() {
        assert_eq!(format_km(5554.6), "5,555 km");
        assert_eq!(format_km(0.0), "0 km");
    }

    #[test]
    fn paths_and_airlines_are_joined() {
        assert_eq!(format_path(&["LHR", "CDG", "JFK"]), "LHR -> CDG -> JFK");

        let legs = vec![
            BTreeSet::from(["BA".to_string()]),
            BTreeSet::from(["AF".to_string(), "AA".to_string()]),
        ];
        assert_eq!(format_airlines(&legs), "BA | AA, AF");
    }

    #[test]
    fn plural_counts() {
        assert_eq!(plural(1, "flight"), "1 flight");
        assert_eq!(plural(3, "flight"), "3 flights");
    }
}
