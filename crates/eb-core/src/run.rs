//! External command execution.
//!
//! Every easyblock hands its shell command lines to a [`CommandRunner`]
//! rather than spawning processes itself. The host supplies a
//! [`ShellRunner`]; tests supply a runner that records commands instead of
//! executing them.
//!
//! A command succeeds if and only if it exits with status 0. Anything else
//! becomes [`BuildError::CommandFailed`] carrying the tail of the captured
//! output, and the step that issued it stops there.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};

use crate::error::{BuildError, Result};

/// Number of output lines attached to a [`BuildError::CommandFailed`].
const ERROR_TAIL_LINES: usize = 20;

/// Output of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    /// Combined stdout and stderr.
    pub output: String,
}

/// Executes shell command lines on behalf of easyblocks.
pub trait CommandRunner {
    /// Run `cmd` through the shell with `workdir` as current directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` on a non-zero exit and
    /// `BuildError::Io` if the process could not be spawned.
    fn run(&self, cmd: &str, workdir: &Path) -> Result<CmdOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, cmd: &str, workdir: &Path) -> Result<CmdOutput> {
        (**self).run(cmd, workdir)
    }
}

/// Runs commands with `/bin/sh -c`, appending their output to a build log.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    log_path: Option<PathBuf>,
    verbose: bool,
}

impl ShellRunner {
    /// Runner that captures output without keeping a log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every command and its output to `path`.
    pub fn with_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Also echo command output to the terminal as it arrives.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The build log, if one is configured.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    fn append_log(&self, cmd: &str, workdir: &Path, output: &str) -> Result<()> {
        let Some(log_path) = &self.log_path else {
            return Ok(());
        };
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BuildError::io("Failed to create log directory", e))?;
        }
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| BuildError::io("Failed to open build log", e))?;
        writeln!(log, "== running in {}: {cmd}", workdir.display())
            .and_then(|()| log.write_all(output.as_bytes()))
            .map_err(|e| BuildError::io("Failed to write build log", e))
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &str, workdir: &Path) -> Result<CmdOutput> {
        tracing::info!("running: {cmd}");
        tracing::debug!("  in {}", workdir.display());

        let mut command = Command::new("/bin/sh");
        command.arg("-c").arg(cmd).current_dir(workdir);

        let (status, output) = if self.verbose {
            run_teed(&mut command)
                .map_err(|e| BuildError::io(format!("Failed to execute '{cmd}'"), e))?
        } else {
            // Both streams go to one file so the output keeps its interleaving.
            let capture = tempfile::tempfile()
                .map_err(|e| BuildError::io("Failed to create output capture file", e))?;
            let stderr = capture
                .try_clone()
                .map_err(|e| BuildError::io("Failed to create output capture file", e))?;
            let mut capture_read = capture
                .try_clone()
                .map_err(|e| BuildError::io("Failed to create output capture file", e))?;
            let status = command
                .stdout(Stdio::from(capture))
                .stderr(Stdio::from(stderr))
                .status()
                .map_err(|e| BuildError::io(format!("Failed to execute '{cmd}'"), e))?;
            let output = read_all(&mut capture_read)
                .map_err(|e| BuildError::io("Failed to read command output", e))?;
            (status, output)
        };

        if let Err(e) = self.append_log(cmd, workdir, &output) {
            tracing::warn!("{e}");
        }

        if !status.success() {
            let tail = last_lines(&output, ERROR_TAIL_LINES);
            if let Some(log) = &self.log_path {
                tracing::error!("command failed, full log: {}", log.display());
            }
            return Err(BuildError::CommandFailed {
                cmd: cmd.to_string(),
                code: status.code(),
                output: tail,
            });
        }

        Ok(CmdOutput { output })
    }
}

/// Run `command` with both streams piped, echoing them to the terminal
/// while collecting them. Lines from the two streams interleave in arrival
/// order.
fn run_teed(command: &mut Command) -> std::io::Result<(ExitStatus, String)> {
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout is not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr is not captured"))?;

    let captured = Mutex::new(String::new());
    std::thread::scope(|scope| {
        let captured = &captured;
        scope.spawn(move || tee_lines(stdout, std::io::stdout(), captured));
        scope.spawn(move || tee_lines(stderr, std::io::stderr(), captured));
    });

    let status = child.wait()?;
    let output = captured
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    Ok((status, output))
}

fn tee_lines(stream: impl Read, mut echo: impl Write, captured: &Mutex<String>) {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    // A read error ends the stream like EOF; the exit status still decides.
    while matches!(reader.read_until(b'\n', &mut line), Ok(n) if n > 0) {
        let _ = echo.write_all(&line).and_then(|()| echo.flush());
        captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(&String::from_utf8_lossy(&line));
        line.clear();
    }
}

/// Read a capture file from the start.
fn read_all(file: &mut File) -> std::io::Result<String> {
    use std::io::{Seek, SeekFrom};

    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Keep only the last `n` lines of `text`.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
