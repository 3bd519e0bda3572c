//! Easyblocks and the host that drives them.
//!
//! An easyblock ([`Easyblock`]) is the install recipe for one kind of
//! package. The host ([`Pipeline`]) freezes an easyconfig into a
//! [`BuildContext`], calls the easyblock's hooks in a fixed order, checks
//! the result and writes an environment module file.
//!
//! # Layout
//!
//! ```text
//! <install_root>/
//! ├── software/<name>/<version>/   # install directories
//! └── modules/all/<name>/<version> # Tcl module files
//! <build_root>/
//! ├── <name>/<version>/            # build directories (removed on success)
//! └── logs/                        # per-build command logs
//! <source_root>/                   # source archives and installers
//! ```

pub mod blocks;
pub mod context;
pub mod easyblock;
pub mod error;
pub mod extract;
pub mod generic;
pub mod module;
pub mod patch;
pub mod paths;
pub mod pipeline;
pub mod registry;
pub mod reporter;
pub mod run;
pub mod sanity;

#[cfg(test)]
mod testing;

pub use context::BuildContext;
pub use easyblock::Easyblock;
pub use error::{BuildError, Result};
pub use paths::*;
pub use pipeline::{BuildReport, Pipeline, PipelineOptions};
pub use reporter::{NullReporter, Reporter};
pub use run::{CmdOutput, CommandRunner, ShellRunner};
