//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::run::{CmdOutput, CommandRunner};

/// Records commands instead of running them. Commands containing `fail_on`
/// fail with exit code 1.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    calls: RefCell<Vec<(String, PathBuf)>>,
    fail_on: Option<String>,
}

impl Recorder {
    pub(crate) fn failing_on(pattern: &str) -> Self {
        Self {
            calls: RefCell::default(),
            fail_on: Some(pattern.to_string()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }
}

impl CommandRunner for Recorder {
    fn run(&self, cmd: &str, workdir: &Path) -> Result<CmdOutput> {
        self.calls
            .borrow_mut()
            .push((cmd.to_string(), workdir.to_path_buf()));
        if self.fail_on.as_deref().is_some_and(|p| cmd.contains(p)) {
            return Err(BuildError::CommandFailed {
                cmd: cmd.to_string(),
                code: Some(1),
                output: "simulated failure".to_string(),
            });
        }
        Ok(CmdOutput::default())
    }
}
