//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use revpack_core::{CommandOutput, CommandRunner, CommandSpec, Config, Project, ProjectName};

type Handler = Box<dyn Fn(&CommandSpec) -> io::Result<CommandOutput>>;

/// Records every command and answers through a closure.
pub struct ScriptedRunner {
    calls: RefCell<Vec<CommandSpec>>,
    handler: Handler,
}

impl ScriptedRunner {
    pub fn new(handler: impl Fn(&CommandSpec) -> io::Result<CommandOutput> + 'static) -> Self {
        ScriptedRunner {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        (self.handler)(spec)
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn project(name: &str) -> Project {
    Project {
        name: ProjectName::from(name),
        git_remote: format!("https://example.org/{name}.git"),
        git_branch: "master".to_string(),
        git_local: PathBuf::from("src").join(name),
        version: "1.0".to_string(),
    }
}

pub fn config(workspace: &Path, projects: Vec<Project>) -> Config {
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

/// Single project `foo` version `1.0` at `src/foo`.
pub fn fixture(workspace: &Path) -> (Config, Project) {
    let foo = project("foo");
    (config(workspace, vec![foo.clone()]), foo)
}

/// Stand-in for `dpkg-source` and `debuild`.
///
/// `dpkg-source` writes `debian/patches/<name>`; `debuild` reads the top
/// changelog header and drops `<name>_<version>-<rev>_all.deb` next to the
/// source tree. Anything else succeeds silently.
pub fn toolchain(spec: &CommandSpec) -> io::Result<CommandOutput> {
    let cwd = spec.cwd.clone().unwrap_or_default();
    let args = spec.args_lossy();
    match spec.program.to_string_lossy().as_ref() {
        "dpkg-source" => {
            let patches = cwd.join("debian").join("patches");
            std::fs::create_dir_all(&patches)?;
            if let Some(name) = args.last() {
                std::fs::write(patches.join(name), "--- a\n+++ b\n")?;
            }
            Ok(ok(""))
        }
        "debuild" => {
            let changelog = std::fs::read_to_string(cwd.join("debian").join("changelog"))?;
            let header = changelog.lines().next().unwrap_or_default();
            let (name, rest) = header.split_once(" (").unwrap_or_default();
            let (verrev, _) = rest.split_once(')').unwrap_or_default();
            let parent = cwd.parent().map(Path::to_path_buf).unwrap_or_default();
            std::fs::write(parent.join(format!("{name}_{verrev}_all.deb")), header)?;
            Ok(ok("dpkg-deb: building package\n"))
        }
        _ => Ok(ok("")),
    }
}
