//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).
//! Progress goes to stderr so stdout stays clean for results.

use crate::core::explain::{EvidenceBucket, EvidenceSource, ParsedExplanation};
use crate::core::types::{ExplanationStatus, ScoreBand};

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for practitioner names
    pub fn name(s: &str) -> ColoredString {
        s.cyan().bold()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for warning messages
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// Style for match scores
    pub fn score(s: &str) -> ColoredString {
        s.magenta()
    }

    /// Style for rank numbers
    pub fn rank(s: &str) -> ColoredString {
        s.green().bold()
    }
}

/// Format a millisecond duration into a human-readable string
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms as f64 / 1000.0;
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{ms}ms")
    }
}

/// Score band label, colored by strength
pub fn format_band(band: ScoreBand) -> String {
    let label = band.label();
    let colored = match band {
        ScoreBand::Excellent | ScoreBand::Strong => colors::success(label),
        ScoreBand::Good | ScoreBand::Moderate => colors::score(label),
        ScoreBand::Fair => colors::warning(label),
        ScoreBand::Weak => colors::dim(label),
    };
    format!("{colored}")
}

pub fn format_status(status: ExplanationStatus) -> String {
    let text = status.as_str();
    let colored = match status {
        ExplanationStatus::Complete => colors::success(text),
        ExplanationStatus::Error => colors::error(text),
        ExplanationStatus::Loading => colors::warning(text),
        ExplanationStatus::Pending => colors::dim(text),
    };
    format!("{colored}")
}

/// Render a parsed explanation, indented by `indent` spaces
pub fn print_explanation(parsed: &ParsedExplanation, indent: usize) {
    let pad = " ".repeat(indent);
    match parsed {
        ParsedExplanation::Structured(report) => {
            for source in [EvidenceSource::LinkedIn, EvidenceSource::Crosslake] {
                print_bucket(source, report.bucket(source), &pad);
            }
            println!(
                "{pad}{} {}/10",
                colors::label("Combined:"),
                colors::number(&report.combined_score().to_string())
            );
        }
        ParsedExplanation::Unparsed(raw) => {
            for line in raw.lines() {
                println!("{pad}{line}");
            }
        }
    }
}

fn print_bucket(source: EvidenceSource, bucket: &EvidenceBucket, pad: &str) {
    println!(
        "{pad}{} {} ({})",
        colors::label(source.label()),
        colors::number(&format!("{}/10", bucket.score)),
        format_band(ScoreBand::for_evidence_score(bucket.score))
    );
    for (title, items) in [("Explicit", &bucket.explicit), ("Inferred", &bucket.inferred)] {
        if items.is_empty() {
            continue;
        }
        println!("{pad}  {}", colors::dim(title));
        for item in items {
            println!("{pad}    • {item}");
        }
    }
}

/// Print a command response as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(data: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a progress line to stderr
pub fn print_progress(message: &str, percent: Option<u8>) {
    match percent {
        Some(p) => eprintln!("{} {}", colors::dim(message), colors::number(&format!("[{p}%]"))),
        None => eprintln!("{}", colors::dim(message)),
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", colors::warning("Warning"), message);
}

/// Print a header/title
pub fn print_header(title: &str) {
    println!("{}", colors::label(title));
}
