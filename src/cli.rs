//! Shared CLI output helpers for the genematrix binaries.

use std::time::{Duration, Instant};

use colored::Colorize;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!("{} {}", "genematrix".bold().cyan(), subtitle.dimmed());
    eprintln!();
}

pub fn section(title: &str) {
    let bar = "─".repeat(50);
    eprintln!("{} {}", title.bold().blue(), bar.dimmed());
}

pub fn kv(key: &str, value: &str) {
    eprintln!("  {:<24} {}", key.dimmed(), value);
}

pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg.yellow());
}

/// Formats a duration as HH:MM:SS.d (tenths of a second).
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

/// Install the `tracing` subscriber; `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_summary(start: Instant) {
    eprintln!();
    eprintln!(
        "{}  {}",
        "Time".dimmed(),
        format_elapsed(start.elapsed()).bold()
    );
    eprintln!();
}
