//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Base and optional dependency sections
//! - `<--` / `-->` lines for every rewritten entry
//! - Skipped entries with their reasons
//! - Parse errors per entry
//! - A one-line summary

use crate::domain::{
    DependencyGroup, EntryOutcome, EntryReport, GroupReport, RunReport, UpdateDecision,
};
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            if self.color {
                format!("{} ", "(dry-run)".cyan())
            } else {
                "(dry-run) ".to_string()
            }
        } else {
            String::new()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Whether a group has anything to print at this verbosity
    fn is_visible(&self, group: &GroupReport) -> bool {
        match self.verbosity {
            Verbosity::Normal => !group.entries.is_empty(),
            Verbosity::Quiet => group.has_updates() || group.parse_failures().next().is_some(),
        }
    }

    fn format_entry(&self, entry: &EntryReport, writer: &mut dyn Write) -> std::io::Result<()> {
        match &entry.outcome {
            EntryOutcome::Decided(UpdateDecision::Update {
                specifier,
                new_version,
                warnings,
                ..
            }) => {
                let new_text = entry
                    .decision()
                    .and_then(UpdateDecision::new_text)
                    .unwrap_or_default();
                if self.color {
                    writeln!(
                        writer,
                        "  {}: {}",
                        specifier.name.bold(),
                        new_version.to_string().green()
                    )?;
                    writeln!(writer, "    {} {}", "<--".red(), entry.raw.dimmed())?;
                    writeln!(writer, "    {} {}", "-->".green(), new_text.bright_white())?;
                } else {
                    writeln!(writer, "  {}: {}", specifier.name, new_version)?;
                    writeln!(writer, "    <-- {}", entry.raw)?;
                    writeln!(writer, "    --> {}", new_text)?;
                }
                for warning in warnings {
                    if self.color {
                        writeln!(writer, "    {} {}", "!".yellow(), warning.yellow())?;
                    } else {
                        writeln!(writer, "    ! {}", warning)?;
                    }
                }
            }
            EntryOutcome::Decided(UpdateDecision::Skip { specifier, reason }) => {
                if self.verbosity == Verbosity::Quiet {
                    return Ok(());
                }
                if self.color {
                    writeln!(
                        writer,
                        "  {} {}",
                        format!("{}:", specifier.name).dimmed(),
                        format!("skipped: {}", reason).dimmed()
                    )?;
                } else {
                    writeln!(writer, "  {}: skipped: {}", specifier.name, reason)?;
                }
            }
            EntryOutcome::ParseFailed(error) => {
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {}",
                        "✗".red(),
                        entry.raw,
                        format!("parse error: {}", error).red()
                    )?;
                } else {
                    writeln!(writer, "  {}: parse error: {}", entry.raw, error)?;
                }
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let report = &result.report;

        let (base, extras): (Vec<&GroupReport>, Vec<&GroupReport>) = report
            .groups
            .iter()
            .filter(|g| self.is_visible(g))
            .partition(|g| g.group.is_base());

        if !base.is_empty() {
            writeln!(writer, "{}", self.heading("Base Dependencies:"))?;
            for group in base {
                self.format_group(group, writer)?;
            }
            writeln!(writer)?;
        }

        if !extras.is_empty() {
            writeln!(writer, "{}", self.heading("Optional Dependencies:"))?;
            for group in extras {
                if let DependencyGroup::Extra(name) = &group.group {
                    writeln!(writer, " [{}]", name)?;
                }
                self.format_group(group, writer)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(report, writer)
    }

    fn format_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = report.total_updates();
        let skips = report.total_skips();
        let errors = report.total_parse_failures();

        if updates == 0 {
            if self.color {
                writeln!(writer, "{}{}", prefix, "No updates required".dimmed())?;
            } else {
                writeln!(writer, "{}No updates required", prefix)?;
            }
        } else {
            let verb = if report.written {
                "updated"
            } else {
                "to update"
            };
            if self.color {
                writeln!(
                    writer,
                    "{}{} {} in {}",
                    prefix,
                    updates.to_string().green(),
                    verb,
                    report.path.display().to_string().bold()
                )?;
            } else {
                writeln!(
                    writer,
                    "{}{} {} in {}",
                    prefix,
                    updates,
                    verb,
                    report.path.display()
                )?;
            }
        }

        if self.verbosity == Verbosity::Normal && (skips > 0 || errors > 0) {
            let line = format!(
                "{} skipped, {} parse error{}",
                skips,
                errors,
                if errors == 1 { "" } else { "s" }
            );
            if self.color {
                writeln!(writer, "{}", line.dimmed())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        Ok(())
    }

    fn format_group(&self, group: &GroupReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for entry in &group.entries {
            self.format_entry(entry, writer)?;
        }
        Ok(())
    }
}
