//! Terminal rendering for ovpack commands.
//!
//! Status lines go to stdout, diagnostics to stderr. Colors are applied only
//! when the stream supports them, so CI logs and `--output json` stay clean.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use ovpack_lib::pipeline::{Artifact, ArtifactKind, BuildReport, StepEvent};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
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

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Human-readable size, binary units, one decimal above bytes.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

  if bytes < 1024 {
    return format!("{} B", bytes);
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", value, UNITS[unit])
}

/// Step timings: milliseconds for quick steps, seconds with one decimal up to
/// a minute, then minutes and seconds (bundling is usually the slow one).
pub fn format_duration(duration: Duration) -> String {
  let millis = duration.as_millis();
  match millis {
    0..1_000 => format!("{}ms", millis),
    1_000..60_000 => format!("{:.1}s", duration.as_secs_f64()),
    _ => format!("{}m {:02}s", millis / 60_000, (millis / 1_000) % 60),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// Progress line for a pipeline event. Failures are reported by the caller
/// with the full error chain, so they print nothing here.
pub fn print_step(event: &StepEvent) {
  match event {
    StepEvent::Started(step) => print_info(&format!("{}...", step.describe())),
    StepEvent::Finished(step, elapsed) => {
      let timing = format!("({})", format_duration(*elapsed));
      print_success(&format!(
        "{} {}",
        step.describe(),
        timing.if_supports_color(Stream::Stdout, |s| s.dimmed())
      ));
    }
    StepEvent::Failed(_) => {}
  }
}

fn artifact_line(artifact: &Artifact) -> String {
  let label = match artifact.kind {
    ArtifactKind::Executable => "Executable",
    ArtifactKind::Archive => "Archive",
  };
  format!(
    "{:<10} {} ({}, sha256 {})",
    label,
    artifact.path.display(),
    format_bytes(artifact.size),
    artifact.sha256.short()
  )
}

pub fn print_build_summary(report: &BuildReport) {
  println!();
  print_success(&format!(
    "Build complete: {} {} for {} in {}",
    report.product_name,
    report.version,
    report.platform.label(),
    format_duration(report.elapsed)
  ));
  for artifact in &report.artifacts {
    println!(
      "  {} {}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      artifact_line(artifact)
    );
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
