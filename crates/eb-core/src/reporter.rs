//! Reporter trait for dependency injection
//!
//! Lets the pipeline report step progress without being coupled to a
//! particular terminal UI.

use eb_schema::{PackageName, Step, Version};

/// Receives progress events from the pipeline.
pub trait Reporter {
    /// A package build is about to start.
    fn package_started(&self, name: &PackageName, version: &Version);

    /// A step is about to run.
    fn step_started(&self, step: Step);

    /// A step finished successfully.
    fn step_done(&self, step: Step);

    /// A step was not run, with the reason.
    fn step_skipped(&self, step: Step, reason: &str);

    /// A step failed; the pipeline stops after this.
    fn step_failed(&self, step: Step, reason: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn package_started(&self, name: &PackageName, version: &Version) {
        (**self).package_started(name, version);
    }
    fn step_started(&self, step: Step) {
        (**self).step_started(step);
    }
    fn step_done(&self, step: Step) {
        (**self).step_done(step);
    }
    fn step_skipped(&self, step: Step, reason: &str) {
        (**self).step_skipped(step, reason);
    }
    fn step_failed(&self, step: Step, reason: &str) {
        (**self).step_failed(step, reason);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent runs (tests, `sanity-check`).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn package_started(&self, _: &PackageName, _: &Version) {}
    fn step_started(&self, _: Step) {}
    fn step_done(&self, _: Step) {}
    fn step_skipped(&self, _: Step, _: &str) {}
    fn step_failed(&self, _: Step, _: &str) {}
    fn warning(&self, _: &str) {}
}
