// Shared helpers for integration tests.
//
// Provides a temporary projection root next to a directory of "remote"
// modules, plus a fake version-control executor that checks modules out and
// updates them by copying from that directory. Each integration test gets an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use modlink_cli::cli::GlobalOpts;
use modlink_cli::config::Settings;
use modlink_cli::error::VcsError;
use modlink_cli::exec::{ExecResult, Executor};
use modlink_cli::logging::MemoryLog;

/// An initialized root and a remote module store, both inside one
/// [`tempfile::TempDir`] that is deleted on drop.
pub struct Fixture {
    dir: tempfile::TempDir,
    root: PathBuf,
    remote: PathBuf,
    pub log: MemoryLog,
    pub vcs: FakeVcs,
}

impl Fixture {
    /// Create a root whose settings point `repository` at the remote store.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        let root = base.join("root");
        let remote = base.join("remote");
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::create_dir_all(&remote).expect("create remote");

        Settings {
            repository: Some(remote.to_string_lossy().into_owned()),
            ..Settings::default()
        }
        .save(&root)
        .expect("write settings");

        Self {
            dir,
            root,
            remote,
            log: MemoryLog::new(),
            vcs: FakeVcs::default(),
        }
    }

    /// Projection root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working copy of `module` under the root's state directory.
    pub fn working_copy(&self, module: &str) -> PathBuf {
        self.root.join(".modlink").join("modules").join(module)
    }

    /// Global options targeting this root.
    pub fn global(&self, force: bool) -> GlobalOpts {
        GlobalOpts {
            force,
            root: Some(self.root.clone()),
        }
    }

    /// Write `content` to `rel` inside the remote copy of `module`.
    pub fn remote_file(&self, module: &str, rel: &str, content: &str) -> &Self {
        let path = self.remote.join(module).join(rel);
        std::fs::create_dir_all(path.parent().expect("remote file has a parent"))
            .expect("create remote dirs");
        std::fs::write(&path, content).expect("write remote file");
        self
    }

    /// Replace the remote descriptor of `module`.
    pub fn remote_descriptor(&self, module: &str, text: &str) -> &Self {
        self.remote_file(module, "modlink.map", text)
    }

    /// Delete `rel` from the remote copy of `module`.
    pub fn remote_remove(&self, module: &str, rel: &str) -> &Self {
        std::fs::remove_file(self.remote.join(module).join(rel)).expect("remove remote file");
        self
    }

    /// Write a plain file under the root, outside any projection.
    pub fn root_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().expect("root file has a parent"))
            .expect("create root dirs");
        std::fs::write(&path, content).expect("write root file");
        path
    }

    /// Whether `rel` under the root is a symlink.
    pub fn is_link(&self, rel: &str) -> bool {
        self.root
            .join(rel)
            .symlink_metadata()
            .is_ok_and(|m| m.file_type().is_symlink())
    }

    /// Whether anything (including a dangling link) exists at `rel`.
    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).symlink_metadata().is_ok()
    }

    /// Content read through `rel` under the root.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("read projected file")
    }

    /// Keep the temp dir alive for as long as the fixture.
    pub fn temp_path(&self) -> &Path {
        self.dir.path()
    }
}

/// Version-control double backed by plain directory copies.
///
/// `checkout`/`clone` copy the URL (a local path) into the destination and
/// remember the pairing; `update`/`pull` replace the working copy with a
/// fresh copy of its remote.
#[derive(Debug, Default)]
pub struct FakeVcs {
    remotes: Mutex<HashMap<PathBuf, PathBuf>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeVcs {
    /// Argument lists of every call so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn fail(program: &str, args: &[&str], stderr: &str) -> VcsError {
        VcsError::CommandFailed {
            program: program.to_string(),
            args: args.join(" "),
            exit_code: 1,
            stderr: stderr.to_string(),
        }
    }

    fn io(program: &str) -> impl Fn(std::io::Error) -> VcsError + '_ {
        move |source| VcsError::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

impl Executor for FakeVcs {
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult, VcsError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(args.iter().map(ToString::to_string).collect());

        match args {
            [op, .., url, dest] if *op == "checkout" || *op == "clone" => {
                let remote = PathBuf::from(url);
                if !remote.is_dir() {
                    return Err(Self::fail(program, args, "repository not found"));
                }
                let dest = PathBuf::from(dest);
                copy_tree(&remote, &dest).map_err(Self::io(program))?;
                self.remotes
                    .lock()
                    .expect("remotes lock")
                    .insert(dest, remote);
            }
            [op, ..] if *op == "update" || *op == "pull" => {
                let remote = self
                    .remotes
                    .lock()
                    .expect("remotes lock")
                    .get(dir)
                    .cloned()
                    .ok_or_else(|| Self::fail(program, args, "not a working copy"))?;
                std::fs::remove_dir_all(dir).map_err(Self::io(program))?;
                copy_tree(&remote, dir).map_err(Self::io(program))?;
            }
            _ => return Err(Self::fail(program, args, "unsupported operation")),
        }

        Ok(ExecResult {
            stdout: format!("{program} {}", args.join(" ")),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }

    fn run_passthrough(&self, _dir: &Path, _program: &str, args: &[&str]) -> Result<(), VcsError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(args.iter().map(ToString::to_string).collect());
        Ok(())
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let out = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&out)?;
        } else {
            std::fs::copy(entry.path(), &out)?;
        }
    }
    Ok(())
}
