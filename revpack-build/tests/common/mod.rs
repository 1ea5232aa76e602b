//! Shared fixtures: a scripted stand-in for git, dpkg-source and debuild.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use revpack_core::{CommandOutput, CommandRunner, CommandSpec, Config, Project, ProjectName};

pub fn project(name: &str) -> Project {
    Project {
        name: ProjectName::from(name),
        git_remote: format!("https://example.org/{name}.git"),
        git_branch: "master".to_string(),
        git_local: PathBuf::from("src").join(name),
        version: "1.0".to_string(),
    }
}

pub fn config(workspace: &Path, names: &[&str]) -> Config {
    let mut projects: Vec<Project> = names.iter().map(|n| project(n)).collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Config {
        workspace: workspace.to_path_buf(),
        distribution: "trusty".to_string(),
        package_ext: "deb".to_string(),
        maintainer: "Developer <dev@localhost>".to_string(),
        packager: vec!["debuild".to_string(), "-uc".to_string(), "-us".to_string()],
        installer: vec!["dpkg".to_string(), "-i".to_string()],
        install_order: Vec::new(),
        disabled: BTreeSet::new(),
        projects,
    }
}

pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn fail(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// In-memory remotes plus on-disk working copies.
///
/// A working copy keeps its remote URL and checked-out commit in
/// `.git/remote` and `.git/tip`.
#[derive(Default)]
pub struct FakeToolchain {
    remotes: RefCell<HashMap<String, String>>,
    failing_builds: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the remote branch tip, as if someone pushed.
    pub fn push(&self, remote: &str, tip: &str) {
        self.remotes
            .borrow_mut()
            .insert(remote.to_string(), tip.to_string());
    }

    /// Make `debuild` exit non-zero for `package`.
    pub fn fail_build(&self, package: &str) {
        self.failing_builds.borrow_mut().insert(package.to_string());
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Calls whose program or git verb matches `verb`.
    pub fn count(&self, verb: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| {
                let args = spec.args_lossy();
                let skip = if args.first().map(String::as_str) == Some("-C") { 2 } else { 0 };
                spec.program.to_string_lossy() == verb
                    || args.get(skip).map(String::as_str) == Some(verb)
            })
            .count()
    }

    fn remote_tip(&self, remote: &str) -> String {
        self.remotes
            .borrow()
            .get(remote)
            .cloned()
            .unwrap_or_else(|| "c0".to_string())
    }

    fn git(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let args = spec.args_lossy();
        if args.first().map(String::as_str) == Some("clone") {
            let (remote, dir) = (&args[1], PathBuf::from(&args[2]));
            if remote.contains("missing") {
                return Ok(fail(128, "fatal: repository not found"));
            }
            let git = dir.join(".git");
            std::fs::create_dir_all(&git)?;
            std::fs::create_dir_all(dir.join("debian"))?;
            std::fs::write(dir.join("setup.py"), "print('hi')\n")?;
            std::fs::write(git.join("remote"), remote)?;
            std::fs::write(git.join("tip"), self.remote_tip(remote))?;
            return Ok(ok(""));
        }

        let repo = PathBuf::from(&args[1]);
        let git = repo.join(".git");
        let rest: Vec<&str> = args[2..].iter().map(String::as_str).collect();
        match rest.as_slice() {
            ["fetch", ..] | ["checkout", ..] => Ok(ok("")),
            ["rev-parse", "--abbrev-ref", "HEAD"] => Ok(ok("master\n")),
            ["rev-parse", "--verify", rev] if rev.starts_with("refs/heads/") => {
                Ok(ok(&std::fs::read_to_string(git.join("tip"))?))
            }
            ["rev-parse", "--verify", _] => {
                let remote = std::fs::read_to_string(git.join("remote"))?;
                Ok(ok(&self.remote_tip(&remote)))
            }
            ["pull", ..] => {
                let remote = std::fs::read_to_string(git.join("remote"))?;
                std::fs::write(git.join("tip"), self.remote_tip(&remote))?;
                std::fs::write(repo.join("setup.py"), "print('changed')\n")?;
                Ok(ok("Fast-forward\n"))
            }
            _ => Ok(fail(1, "unexpected git invocation")),
        }
    }

    fn debuild(&self, cwd: &Path) -> io::Result<CommandOutput> {
        let changelog = std::fs::read_to_string(cwd.join("debian").join("changelog"))?;
        let header = changelog.lines().next().unwrap_or_default().to_string();
        let (name, rest) = header.split_once(" (").unwrap_or_default();
        if self.failing_builds.borrow().contains(name) {
            return Ok(fail(29, "dpkg-buildpackage: error: debian/rules build failed"));
        }
        let (verrev, _) = rest.split_once(')').unwrap_or_default();
        let parent = cwd.parent().map(Path::to_path_buf).unwrap_or_default();
        std::fs::write(parent.join(format!("{name}_{verrev}_all.deb")), &header)?;
        Ok(ok(""))
    }
}

impl CommandRunner for FakeToolchain {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        let cwd = spec.cwd.clone().unwrap_or_default();
        match spec.program.to_string_lossy().as_ref() {
            "git" => self.git(spec),
            "dpkg-source" => {
                let patches = cwd.join("debian").join("patches");
                std::fs::create_dir_all(&patches)?;
                if let Some(name) = spec.args_lossy().last() {
                    std::fs::write(patches.join(name), "--- a\n+++ b\n")?;
                }
                Ok(ok(""))
            }
            "debuild" => self.debuild(&cwd),
            "dpkg" => Ok(ok("")),
            other => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{other}: not found"),
            )),
        }
    }
}
