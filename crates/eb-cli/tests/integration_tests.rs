//! Integration tests for the `eb` CLI.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Test context that sets up an isolated prefix for installs, builds and sources
struct TestContext {
    temp_dir: TempDir,
    prefix: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let prefix = temp_dir.path().join("easybuild");
        fs::create_dir_all(prefix.join("sources")).expect("failed to create sources dir");
        Self { temp_dir, prefix }
    }

    fn eb_cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_eb"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("EB_PREFIX", &self.prefix);
        for var in ["EB_INSTALLPATH", "EB_BUILDPATH", "EB_SOURCEPATH", "RUST_LOG"] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn eb(&self, args: &[&str]) -> Output {
        self.eb_cmd().args(args).output().expect("failed to run eb")
    }

    fn sources(&self) -> PathBuf {
        self.prefix.join("sources")
    }

    fn easyconfig(&self, file: &str, content: &str) -> String {
        let path = self.temp_dir.path().join(file);
        fs::write(&path, content).expect("failed to write easyconfig");
        path.display().to_string()
    }

    fn installdir(&self, name: &str, version: &str) -> PathBuf {
        self.prefix.join("software").join(name).join(version)
    }

    fn module_file(&self, name: &str, version: &str) -> PathBuf {
        self.prefix.join("modules/all").join(name).join(version)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write a .tar.gz holding `entries` (path, contents), all mode 0755.
fn make_tarball(dest: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(dest).expect("failed to create tarball");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .expect("failed to append entry");
    }
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("failed to finish tarball");
}

fn have_patch() -> bool {
    Command::new("patch").arg("--version").output().is_ok()
}

const CST_EASYCONFIG: &str = r#"
[package]
name = "CST"
version = "2019.05-GA"
description = "CST STUDIO SUITE electromagnetic simulation"

[source]
files = ["CST-2019.05.tar.gz"]
"#;

/// Reads USER_INSTALL_DIR from the replay file and creates the launchers.
const CST_INSTALL_SH: &str = r#"#!/bin/sh
set -e
while [ $# -gt 0 ]; do
  case "$1" in
    --replay) replay="$2"; shift 2 ;;
    *) shift ;;
  esac
done
dest=$(sed -n 's/^USER_INSTALL_DIR=//p' "$replay")
mkdir -p "$dest"
printf '#!/bin/sh\necho old\n' > "$dest/cst_design_environment"
touch "$dest/cst_design_environment_gui" "$dest/cst_boardcheck"
"#;

const CST_PATCH: &str = "\
--- a/cst_design_environment
+++ b/cst_design_environment
@@ -1,2 +1,2 @@
 #!/bin/sh
-echo old
+echo new
";

const STARCCM_EASYCONFIG: &str = r#"
[package]
name = "STAR-CCM+"
version = "12.02.010"

[source]
files = ["STAR-CCM+12.02.010_01_linux-x86_64.bin"]
"#;

const GHC_EASYCONFIG: &str = r#"
[package]
name = "GHC"
version = "7.6.3"

[source]
files = ["ghc-7.6.3-src.tar.gz"]
"#;

/// Installs into <INSTALLDIR>/<version>/STAR-CCM+<upstream> like the vendor's.
const STARCCM_INSTALLER: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -DINSTALLDIR=*) prefix="${arg#-DINSTALLDIR=}" ;;
  esac
done
bin="$prefix/12.02.010/STAR-CCM+12.02.010/star/bin"
mkdir -p "$bin"
printf '#!/bin/sh\n' > "$bin/starccm+"
"#;

fn write_starccm_installer(ctx: &TestContext) {
    let installer = ctx.sources().join("STAR-CCM+12.02.010_01_linux-x86_64.bin");
    fs::write(&installer, STARCCM_INSTALLER).unwrap();
    fs::set_permissions(&installer, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.eb(&["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Usage:"));
    assert!(out.contains("install"));
    assert!(out.contains("sanity-check"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.eb(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("eb "));
}

#[test]
fn test_list_command() {
    let ctx = TestContext::new();
    let output = ctx.eb(&["list"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for name in ["CST", "GHC", "STAR-CCM+", "ConfigureMake"] {
        assert!(out.contains(name), "{name} missing from list output:\n{out}");
    }
}

#[test]
fn test_show_cst_plan() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig("cst.toml", CST_EASYCONFIG);

    let output = ctx.eb(&["show", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("CST 2019.05-GA"));
    assert!(out.contains("software/CST/2019.05-GA"));
    assert!(out.contains("CST-2019.05/install.sh --replay"));
    assert!(out.contains("CST-2019.05/installer.properties --nogui --no-pkg-check"));
    assert!(out.contains("(missing)"));
}

#[test]
fn test_show_starccm_before_extraction() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig("starccm.toml", STARCCM_EASYCONFIG);

    let output = ctx.eb(&["show", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("found after extraction"));
}

#[test]
fn test_dry_run_installs_nothing() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig("cst.toml", CST_EASYCONFIG);

    let output = ctx.eb(&["--dry-run", "install", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Dry run"));
    assert!(out.contains("sanity_check"));
    assert!(!ctx.installdir("CST", "2019.05-GA").exists());
    assert!(!ctx.prefix.join("build").exists());
}

#[test]
fn test_install_cst() {
    if !have_patch() {
        eprintln!("skipping: patch not installed");
        return;
    }
    let ctx = TestContext::new();
    make_tarball(
        &ctx.sources().join("CST-2019.05.tar.gz"),
        &[
            ("CST-2019.05/install.sh", CST_INSTALL_SH),
            ("CST-2019.05/cst.patch", CST_PATCH),
        ],
    );
    let ec = ctx.easyconfig("cst.toml", CST_EASYCONFIG);

    let output = ctx.eb(&["install", &ec]);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );

    let installdir = ctx.installdir("CST", "2019.05-GA");
    let launcher = fs::read_to_string(installdir.join("cst_design_environment")).unwrap();
    assert!(launcher.contains("echo new"), "patch not applied: {launcher}");
    assert!(installdir.join("cst_boardcheck").is_file());

    let module = fs::read_to_string(ctx.module_file("CST", "2019.05-GA")).unwrap();
    assert!(module.starts_with("#%Module"));
    assert!(module.contains("prepend-path\tPATH\t\t$root"));
    assert!(module.contains("EBROOTCST"));
    assert!(module.contains("EBVERSIONCST\t\t\"2019.05-GA\""));

    // Build directory is removed, the log stays.
    assert!(!ctx.prefix.join("build/CST/2019.05-GA").exists());
    let logs: Vec<_> = fs::read_dir(ctx.prefix.join("build/logs"))
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(logs.len(), 1);
    let log = fs::read_to_string(logs[0].path()).unwrap();
    assert!(log.contains("--replay"));

    let output = ctx.eb(&["sanity-check", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("passed its sanity check"));
}

#[test]
fn test_install_starccm() {
    let ctx = TestContext::new();
    write_starccm_installer(&ctx);
    let ec = ctx.easyconfig("starccm.toml", STARCCM_EASYCONFIG);

    let output = ctx.eb(&["install", "--keep-builddir", &ec]);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );

    let installdir = ctx.installdir("STAR-CCM+", "12.02.010");
    assert!(
        installdir
            .join("STAR-CCM+12.02.010/star/bin/starccm+")
            .is_file()
    );
    assert!(ctx.prefix.join("build/STAR-CCM+/12.02.010").exists());

    let module = fs::read_to_string(ctx.module_file("STAR-CCM+", "12.02.010")).unwrap();
    assert!(module.contains("[file join $root STAR-CCM+12.02.010/star/bin]"));
    assert!(module.contains("EBROOTSTARMINCCMPLUS"));

    let output = ctx.eb(&["module", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), module);
}

#[test]
fn test_skip_module() {
    let ctx = TestContext::new();
    write_starccm_installer(&ctx);
    let ec = ctx.easyconfig("starccm.toml", STARCCM_EASYCONFIG);

    let output = ctx.eb(&["install", "--skip-module", &ec]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("skipped (--skip-module)"));
    assert!(!ctx.module_file("STAR-CCM+", "12.02.010").exists());
}

#[test]
fn test_failed_configure_stops_install() {
    let ctx = TestContext::new();
    make_tarball(
        &ctx.sources().join("ghc-7.6.3-src.tar.gz"),
        &[(
            "ghc-7.6.3/configure",
            "#!/bin/sh\necho 'configure: error: no acceptable C compiler found'\nexit 1\n",
        )],
    );
    let ec = ctx.easyconfig("ghc.toml", GHC_EASYCONFIG);

    let output = ctx.eb(&["install", &ec]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Failed to install GHC 7.6.3"), "stderr: {err}");
    assert!(err.contains("no acceptable C compiler"), "stderr: {err}");
    assert!(!ctx.module_file("GHC", "7.6.3").exists());
    // Left in place for inspection.
    assert!(ctx.prefix.join("build/GHC/7.6.3/ghc-7.6.3/configure").exists());
}

#[test]
fn test_verbose_failure_shows_and_reports_output() {
    let ctx = TestContext::new();
    make_tarball(
        &ctx.sources().join("ghc-7.6.3-src.tar.gz"),
        &[(
            "ghc-7.6.3/configure",
            "#!/bin/sh\necho 'configure: error: no acceptable C compiler found'\nexit 1\n",
        )],
    );
    let ec = ctx.easyconfig("ghc.toml", GHC_EASYCONFIG);

    let output = ctx.eb(&["--verbose", "install", &ec]);
    assert!(!output.status.success());
    // Echoed live, and still attached to the error.
    assert!(stdout(&output).contains("no acceptable C compiler"));
    let err = stderr(&output);
    assert!(err.contains("no acceptable C compiler"), "stderr: {err}");
}

#[test]
fn test_install_under_paths_with_spaces() {
    let ctx = TestContext::new();
    write_starccm_installer(&ctx);
    let ec = ctx.easyconfig("starccm.toml", STARCCM_EASYCONFIG);
    let apps = ctx.temp_dir.path().join("John Doe/apps");
    let build = ctx.temp_dir.path().join("John Doe/build tmp");

    let output = ctx
        .eb_cmd()
        .args(["install", &ec, "--installpath"])
        .arg(&apps)
        .arg("--buildpath")
        .arg(&build)
        .output()
        .expect("failed to run eb");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout(&output),
        stderr(&output)
    );
    let installdir = apps.join("software/STAR-CCM+/12.02.010");
    assert!(
        installdir
            .join("STAR-CCM+12.02.010/star/bin/starccm+")
            .is_file()
    );
    let module = fs::read_to_string(apps.join("modules/all/STAR-CCM+/12.02.010")).unwrap();
    assert!(module.contains(&format!("set root {{{}}}", installdir.display())));
}

#[test]
fn test_sanity_check_missing_installation() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig("cst.toml", CST_EASYCONFIG);

    let output = ctx.eb(&["sanity-check", &ec]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not installed"));
}

#[test]
fn test_sanity_check_reports_missing_files() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig("cst.toml", CST_EASYCONFIG);
    let installdir = ctx.installdir("CST", "2019.05-GA");
    fs::create_dir_all(&installdir).unwrap();
    fs::write(installdir.join("cst_design_environment"), "").unwrap();

    let output = ctx.eb(&["sanity-check", &ec]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("cst_design_environment_gui"), "stderr: {err}");
    assert!(err.contains("cst_boardcheck"), "stderr: {err}");
}

#[test]
fn test_unknown_easyblock() {
    let ctx = TestContext::new();
    let ec = ctx.easyconfig(
        "foo.toml",
        "[package]\nname = \"foo\"\nversion = \"1.0\"\neasyblock = \"Nope\"\n",
    );

    let output = ctx.eb(&["install", &ec]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No easyblock found for 'Nope'"));
}

#[test]
fn test_explicit_paths_override_prefix() {
    let ctx = TestContext::new();
    write_starccm_installer(&ctx);
    let ec = ctx.easyconfig("starccm.toml", STARCCM_EASYCONFIG);
    let apps = ctx.temp_dir.path().join("apps");

    let output = ctx
        .eb_cmd()
        .args(["install", &ec, "--installpath"])
        .arg(&apps)
        .output()
        .expect("failed to run eb");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(apps.join("modules/all/STAR-CCM+/12.02.010").is_file());
    assert!(!ctx.prefix.join("software").exists());
}
