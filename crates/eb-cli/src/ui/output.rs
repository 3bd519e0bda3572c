//! Step progress and messages
//!
//! On a terminal the running step is drawn on one line and overwritten with
//! its result. Otherwise (pipes, logs, tests) only results are printed, one
//! per line.

use std::cell::Cell;
use std::io::{IsTerminal, Write, stdout};
use std::time::Instant;

use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use eb_core::Reporter;
use eb_schema::{PackageName, Step, Version};

use super::theme::{Theme, format_secs};

/// Terminal output handle used by every command.
#[derive(Debug)]
pub struct Output {
    theme: Theme,
    live: bool,
    step_started: Cell<Option<Instant>>,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Output that redraws the running step when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            live: stdout().is_terminal(),
            step_started: Cell::new(None),
        }
    }

    /// Turn off line redrawing, e.g. when command output is streamed to the
    /// same terminal.
    pub fn plain(mut self, plain: bool) -> Self {
        self.live &= !plain;
        self
    }

    /// A bold section header.
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.with(self.theme.colors.version).bold());
    }

    /// A `label  value` line, labels aligned.
    pub fn field(&self, label: &str, value: &str) {
        println!(
            "  {} {value}",
            format!("{label:<14}").with(self.theme.colors.header)
        );
    }

    /// An informational message.
    pub fn info(&self, msg: &str) {
        println!(
            "  {} {msg}",
            self.theme.icons.info.with(self.theme.colors.secondary)
        );
    }

    /// A success message.
    pub fn success(&self, msg: &str) {
        println!(
            "  {} {msg}",
            self.theme.icons.success.with(self.theme.colors.success)
        );
    }

    /// Final line after installing one or more packages.
    pub fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        let noun = if count == 1 { "package" } else { "packages" };
        println!();
        println!(
            "  {} {count} {noun} {action} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            format!("in {}", format_secs(elapsed_secs)).with(self.theme.colors.secondary)
        );
    }

    fn elapsed(&self) -> String {
        self.step_started
            .take()
            .map(|t| format_secs(t.elapsed().as_secs_f64()))
            .unwrap_or_default()
    }

    /// Replace the live step line, if one is drawn.
    fn clear_line(&self) {
        if self.live {
            let mut out = stdout();
            let _ = out.queue(MoveToColumn(0));
            let _ = out.queue(Clear(ClearType::CurrentLine));
            let _ = out.flush();
        }
    }

    fn step_line(&self, icon: &str, step: Step, detail: &str) {
        self.clear_line();
        println!("  {icon} {:<14}{detail}", step.as_str());
    }
}

impl Reporter for Output {
    fn package_started(&self, name: &PackageName, version: &Version) {
        println!();
        println!(
            "{} {}",
            name.as_str().with(self.theme.colors.package_name).bold(),
            version.as_str().with(self.theme.colors.version)
        );
    }

    fn step_started(&self, step: Step) {
        self.step_started.set(Some(Instant::now()));
        if self.live {
            let mut out = stdout();
            print!(
                "  {} {}",
                self.theme.icons.active.with(self.theme.colors.active),
                step.as_str()
            );
            let _ = out.flush();
        }
    }

    fn step_done(&self, step: Step) {
        let elapsed = self.elapsed();
        self.step_line(
            &self
                .theme
                .icons
                .success
                .with(self.theme.colors.success)
                .to_string(),
            step,
            &elapsed.with(self.theme.colors.secondary).to_string(),
        );
    }

    fn step_skipped(&self, step: Step, reason: &str) {
        self.step_line(
            &self
                .theme
                .icons
                .skipped
                .with(self.theme.colors.secondary)
                .to_string(),
            step,
            &format!("skipped ({reason})")
                .with(self.theme.colors.secondary)
                .to_string(),
        );
    }

    fn step_failed(&self, step: Step, reason: &str) {
        self.step_started.set(None);
        let first_line = reason.lines().next().unwrap_or_default();
        self.step_line(
            &self.theme.icons.error.with(self.theme.colors.error).to_string(),
            step,
            &first_line.with(self.theme.colors.error).to_string(),
        );
    }

    fn warning(&self, msg: &str) {
        self.clear_line();
        println!(
            "  {} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        );
    }
}
