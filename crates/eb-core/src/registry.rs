//! Easyblock lookup by name

use eb_schema::EasyConfig;

use crate::blocks::{Cst, Ghc, StarCcm};
use crate::easyblock::Easyblock;
use crate::error::{BuildError, Result};
use crate::generic::{Binary, ConfigureMake, PackedBinary};

/// Whether an easyblock targets one package or is a reusable recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Selected automatically for the software of the same name.
    Package,
    /// Only used when an easyconfig names it explicitly.
    Generic,
}

/// A registered easyblock.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    /// Name matched against easyconfigs, case-insensitively.
    pub name: &'static str,
    /// Package or generic.
    pub kind: Kind,
    /// One-line summary for `eb list`.
    pub summary: &'static str,
    make: fn() -> Box<dyn Easyblock>,
}

impl Entry {
    /// A fresh instance of this easyblock.
    pub fn create(&self) -> Box<dyn Easyblock> {
        (self.make)()
    }
}

static ENTRIES: &[Entry] = &[
    Entry {
        name: "CST",
        kind: Kind::Package,
        summary: "CST STUDIO SUITE via install.sh with a replay file",
        make: || Box::new(Cst::default()),
    },
    Entry {
        name: "GHC",
        kind: Kind::Package,
        summary: "Glasgow Haskell Compiler, configure/make (no build before 7.0)",
        make: || Box::new(Ghc::default()),
    },
    Entry {
        name: "STAR-CCM+",
        kind: Kind::Package,
        summary: "STAR-CCM+ via its silent .bin installer",
        make: || Box::new(StarCcm::default()),
    },
    Entry {
        name: "Binary",
        kind: Kind::Generic,
        summary: "copy sources, run install_cmd or copy into place",
        make: || Box::new(Binary),
    },
    Entry {
        name: "PackedBinary",
        kind: Kind::Generic,
        summary: "unpack sources, run install_cmd or copy into place",
        make: || Box::new(PackedBinary::default()),
    },
    Entry {
        name: "ConfigureMake",
        kind: Kind::Generic,
        summary: "./configure, make, make install",
        make: || Box::new(ConfigureMake),
    },
];

/// Every registered easyblock, package easyblocks first.
pub fn available() -> &'static [Entry] {
    ENTRIES
}

/// Look up an easyblock by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static Entry> {
    ENTRIES.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

/// Pick the easyblock for an easyconfig: its explicit `easyblock` field if
/// set, otherwise the package easyblock named like the software.
///
/// # Errors
///
/// Returns `BuildError::UnknownEasyblock` if nothing matches.
pub fn resolve(ec: &EasyConfig) -> Result<Box<dyn Easyblock>> {
    let entry = match ec.package.easyblock.as_deref() {
        Some(explicit) => find(explicit),
        None => ENTRIES
            .iter()
            .filter(|e| e.kind == Kind::Package)
            .find(|e| ec.package.name == e.name),
    };
    let requested = ec
        .package
        .easyblock
        .clone()
        .unwrap_or_else(|| ec.package.name.to_string());
    let entry = entry.ok_or(BuildError::UnknownEasyblock(requested))?;
    tracing::debug!("using easyblock {} for {}", entry.name, ec.package.name);
    Ok(entry.create())
}
