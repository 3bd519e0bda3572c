//! Environment module file generation
//!
//! Easyblocks only say which subdirectories *might* belong on a search path.
//! This module keeps the ones that exist after installation and renders a
//! Tcl `#%Module` file for them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::context::BuildContext;
use crate::error::{BuildError, Result};

/// Environment variable name to candidate subdirectories of the install
/// directory, in prepend order. An empty string stands for the install
/// directory itself.
pub type ModuleGuesses = BTreeMap<String, Vec<String>>;

/// Search path guesses every package starts from.
pub fn default_guesses() -> ModuleGuesses {
    let lib_dirs = || vec!["lib".to_string(), "lib32".to_string(), "lib64".to_string()];
    let mut guesses = ModuleGuesses::new();
    guesses.insert("PATH".into(), vec!["bin".into(), "sbin".into()]);
    guesses.insert("LD_LIBRARY_PATH".into(), lib_dirs());
    guesses.insert("LIBRARY_PATH".into(), lib_dirs());
    guesses.insert("CPATH".into(), vec!["include".into()]);
    guesses.insert("MANPATH".into(), vec!["man".into(), "share/man".into()]);
    guesses.insert(
        "PKG_CONFIG_PATH".into(),
        vec!["lib/pkgconfig".into(), "share/pkgconfig".into()],
    );
    guesses.insert("ACLOCAL_PATH".into(), vec!["share/aclocal".into()]);
    guesses.insert("XDG_DATA_DIRS".into(), vec!["share".into()]);
    guesses
}

/// A module file ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    name: String,
    version: String,
    description: String,
    root: String,
    env_suffix: String,
    prepend: Vec<(String, Vec<String>)>,
    setenv: Vec<(String, String)>,
}

impl ModuleFile {
    /// Resolve `guesses` against the install directory and add the
    /// easyconfig's extra paths and variables.
    ///
    /// Guessed directories that do not exist are dropped. Extra paths from
    /// the easyconfig are kept as given.
    pub fn generate(ctx: &BuildContext, guesses: &ModuleGuesses) -> Self {
        let mut prepend: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (var, dirs) in guesses {
            let existing: Vec<String> = dirs
                .iter()
                .filter(|dir| is_dir_under(&ctx.installdir, dir))
                .cloned()
                .collect();
            if existing.is_empty() {
                tracing::debug!("module: no existing paths for {var}");
            } else {
                prepend.entry(var.clone()).or_default().extend(existing);
            }
        }

        for (var, dirs) in &ctx.module_extra.extra_paths {
            prepend
                .entry(var.clone())
                .or_default()
                .extend(dirs.iter().cloned());
        }

        Self {
            name: ctx.name.to_string(),
            version: ctx.version.to_string(),
            description: ctx.description.clone(),
            root: ctx.installdir.display().to_string(),
            env_suffix: ctx.name.env_suffix(),
            prepend: prepend.into_iter().collect(),
            setenv: ctx
                .module_extra
                .extra_vars
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Variables and the relative paths prepended to them.
    pub fn prepend_paths(&self) -> &[(String, Vec<String>)] {
        &self.prepend
    }

    /// Render as a Tcl environment module.
    pub fn render(&self) -> String {
        let mut out = String::from("#%Module\n");
        let description = if self.description.is_empty() {
            format!("{} {}", self.name, self.version)
        } else {
            self.description.clone()
        };

        let _ = writeln!(out, "proc ModulesHelp {{ }} {{");
        let _ = writeln!(out, "    puts stderr {{{description}}}");
        let _ = writeln!(out, "}}");
        let _ = writeln!(out);
        let _ = writeln!(out, "module-whatis {{Description: {description}}}");
        let _ = writeln!(out);
        let _ = writeln!(out, "set root {{{}}}", self.root);
        let _ = writeln!(out);
        let _ = writeln!(out, "conflict {}", self.name);
        let _ = writeln!(out);

        for (var, dirs) in &self.prepend {
            for dir in dirs {
                if dir.is_empty() {
                    let _ = writeln!(out, "prepend-path\t{var}\t\t$root");
                } else {
                    let _ = writeln!(
                        out,
                        "prepend-path\t{var}\t\t[file join $root {}]",
                        tcl_word(dir)
                    );
                }
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "setenv\tEBROOT{}\t\t\"$root\"", self.env_suffix);
        let _ = writeln!(
            out,
            "setenv\tEBVERSION{}\t\t\"{}\"",
            self.env_suffix, self.version
        );
        for (var, value) in &self.setenv {
            let _ = writeln!(out, "setenv\t{var}\t\t\"{value}\"");
        }
        out
    }

    /// Render and write to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BuildError::io(
                    format!("Failed to create module directory {}", parent.display()),
                    e,
                )
            })?;
        }
        std::fs::write(path, self.render()).map_err(|e| {
            BuildError::io(format!("Failed to write module file {}", path.display()), e)
        })?;
        tracing::info!("wrote module file {}", path.display());
        Ok(())
    }
}

/// `word` as a single Tcl word: braced if it holds whitespace or characters
/// Tcl would substitute.
fn tcl_word(word: &str) -> Cow<'_, str> {
    if word
        .chars()
        .any(|c| c.is_whitespace() || "$[]{}\";\\".contains(c))
    {
        Cow::Owned(format!("{{{word}}}"))
    } else {
        Cow::Borrowed(word)
    }
}

fn is_dir_under(installdir: &Path, rel: &str) -> bool {
    if rel.is_empty() {
        installdir.is_dir()
    } else {
        installdir.join(rel).is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_only_existing_guesses_are_kept() {
        let tmp = tempdir().unwrap();
        let install = tmp.path().join("ghc");
        fs::create_dir_all(install.join("bin")).unwrap();
        fs::create_dir_all(install.join("lib")).unwrap();
        fs::create_dir_all(install.join("share/man")).unwrap();

        let ctx = BuildContext::new("GHC", "7.6.3", &install, tmp.path().join("build"));
        let module = ModuleFile::generate(&ctx, &default_guesses());

        let vars: Vec<&str> = module
            .prepend_paths()
            .iter()
            .map(|(v, _)| v.as_str())
            .collect();
        assert_eq!(
            vars,
            vec![
                "LD_LIBRARY_PATH",
                "LIBRARY_PATH",
                "MANPATH",
                "PATH",
                "XDG_DATA_DIRS"
            ]
        );

        let text = module.render();
        assert!(text.contains("prepend-path\tPATH\t\t[file join $root bin]"));
        assert!(!text.contains("sbin"));
        assert!(!text.contains("lib64"));
        assert!(!text.contains("CPATH"));
    }

    #[test]
    fn test_env_vars_and_root() {
        let tmp = tempdir().unwrap();
        let ctx = BuildContext::new("STAR-CCM+", "12.02.010", tmp.path(), tmp.path());
        let text = ModuleFile::generate(&ctx, &ModuleGuesses::new()).render();

        assert!(text.starts_with("#%Module\n"));
        assert!(text.contains(&format!("set root {{{}}}", tmp.path().display())));
        assert!(text.contains("setenv\tEBROOTSTARMINCCMPLUS\t\t\"$root\""));
        assert!(text.contains("setenv\tEBVERSIONSTARMINCCMPLUS\t\t\"12.02.010\""));
    }

    #[test]
    fn test_install_root_guess() {
        let tmp = tempdir().unwrap();
        let ctx = BuildContext::new("CST", "2019.05", tmp.path(), tmp.path());
        let mut guesses = ModuleGuesses::new();
        guesses.insert("PATH".into(), vec![String::new()]);

        let text = ModuleFile::generate(&ctx, &guesses).render();
        assert!(text.contains("prepend-path\tPATH\t\t$root\n"));
    }

    #[test]
    fn test_easyconfig_extras() {
        let tmp = tempdir().unwrap();
        let mut ctx = BuildContext::new("CST", "2019.05", tmp.path(), tmp.path());
        ctx.module_extra
            .extra_paths
            .insert("PYTHONPATH".into(), vec!["python/lib".into()]);
        ctx.module_extra
            .extra_vars
            .insert("CST_LICENSE".into(), "cst@local".into());

        let text = ModuleFile::generate(&ctx, &ModuleGuesses::new()).render();
        // Extra paths are kept even though the directory does not exist
        assert!(text.contains("prepend-path\tPYTHONPATH\t\t[file join $root python/lib]"));
        assert!(text.contains("setenv\tCST_LICENSE\t\t\"cst@local\""));
    }

    #[test]
    fn test_paths_with_spaces_stay_one_tcl_word() {
        let tmp = tempdir().unwrap();
        let install = tmp.path().join("John Doe/software/CST/2019.05");
        fs::create_dir_all(install.join("cst tools")).unwrap();
        let ctx = BuildContext::new("CST", "2019.05", &install, tmp.path());
        let mut guesses = ModuleGuesses::new();
        guesses.insert("PATH".into(), vec!["cst tools".into()]);

        let text = ModuleFile::generate(&ctx, &guesses).render();
        assert!(text.contains(&format!("set root {{{}}}\n", install.display())));
        assert!(text.contains("prepend-path\tPATH\t\t[file join $root {cst tools}]"));
    }

    #[test]
    fn test_tcl_word() {
        assert_eq!(tcl_word("share/man"), "share/man");
        assert_eq!(tcl_word("a b"), "{a b}");
        assert_eq!(tcl_word("$HOME"), "{$HOME}");
    }

    #[test]
    fn test_write_creates_parents() {
        let tmp = tempdir().unwrap();
        let ctx = BuildContext::new("GHC", "7.6.3", tmp.path(), tmp.path());
        let path = tmp.path().join("modules/all/GHC/7.6.3");
        ModuleFile::generate(&ctx, &default_guesses())
            .write(&path)
            .unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("EBVERSIONGHC"));
    }
}
