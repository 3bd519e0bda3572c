//! Prebuilt software shipped inside an archive.

use crate::context::BuildContext;
use crate::easyblock::Easyblock;
use crate::error::Result;
use crate::run::CommandRunner;

use super::Binary;

/// Like [`Binary`], but sources are unpacked first.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedBinary {
    binary: Binary,
}

impl Easyblock for PackedBinary {
    fn name(&self) -> &'static str {
        "PackedBinary"
    }

    // The default extract step unpacks, which is what sets this apart.

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        self.binary.install_step(ctx, runner)
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        self.binary.install_command(ctx)
    }
}
